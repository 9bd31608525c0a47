pub mod tutor;

pub use tutor::TutorAgent;
