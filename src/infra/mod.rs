// Adapters for the ports in app::ports

pub mod gemini;

pub use gemini::GeminiBackend;
