pub mod codes;
pub mod digital_id;
pub mod registration;
