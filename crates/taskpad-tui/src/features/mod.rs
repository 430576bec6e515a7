//! Screen features: per-screen state, reducers, and render functions.

pub mod form_screen;
pub mod home;
pub mod login;
pub mod profile;
pub mod reset;
pub mod signup;
