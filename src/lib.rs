// src/lib.rs

// Deklaracje modułów
pub mod auth; // dla src/auth.rs
pub mod client; // dla src/client.rs
pub mod errors; // dla src/errors.rs
pub mod form; // dla src/form.rs
pub mod models; // dla src/models.rs
pub mod services; // dla src/services.rs
pub mod state; // dla src/state.rs
