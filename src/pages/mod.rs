pub mod layout;
pub mod login;
pub mod student;
pub mod teacher_attendance;
pub mod teacher_exams;
