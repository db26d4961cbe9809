//! Emergency SOS: the hold gesture, best-effort location, and the alert plus
//! E-FIR write that follows a completed hold or a device trigger.

pub mod dispatch;
pub mod efir;
pub mod hold;
pub mod location;
pub mod sessions;
