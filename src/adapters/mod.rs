// Adapters layer: concrete implementations for external systems (http, storage).

pub mod gemini;
pub mod storage;

pub use gemini::GeminiClient;
pub use storage::LocalStorage;
