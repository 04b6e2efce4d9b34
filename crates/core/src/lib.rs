//! # EduMind Core
//!
//! Domain types, traits, and error definitions for the EduMind chat
//! pipeline. This crate has **zero framework dependencies**: it defines the
//! domain model that the extraction, provider, and session crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! The backend is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod attachment;
pub mod message;
pub mod model;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{AttachmentError, ProviderError, SessionError};
pub use attachment::{Attachment, AttachmentKind, ExtractedContent};
pub use message::{ContentPart, Conversation, ConversationTurn, MessageContent, Role};
pub use model::{Capability, ModelDescriptor, ModelRegistry};
pub use provider::{ChatRequest, Provider};
