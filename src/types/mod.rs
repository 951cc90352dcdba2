pub mod gemini;
pub mod personal_data;

pub use personal_data::PersonalData;
