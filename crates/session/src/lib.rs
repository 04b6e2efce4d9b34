//! The EduMind send pipeline.
//!
//! A [`ChatSession`] owns the pending attachments and the conversation
//! history. Each send flows one way:
//!
//! ```text
//! attachments → AttachmentExtractor → ModelCapabilityRouter → ContentAssembler → Provider
//!                                                                                  ↓
//!                                                   ConversationHistory (text mode only)
//! ```

pub mod assembler;
pub mod history;
pub mod router;
pub mod session;

pub use assembler::{ContentAssembler, PreparedAttachment};
pub use history::ConversationHistory;
pub use router::{ModelCapabilityRouter, RouteDecision};
pub use session::{ChatSession, SendOutcome, SendState};
