pub mod me;
pub mod onboarding;
pub mod people;
