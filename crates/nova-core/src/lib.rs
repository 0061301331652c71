//! Nova Core - stateful artifact layer
//!
//! Turns a bare route id into an open, editable artifact:
//! - Resolves ids to item descriptors under a loading overlay
//! - Routes each item kind (project, artifact, sub-artifact, baseline)
//! - Wraps artifacts with dirty, lock, historical and deleted state
//! - Loads each artifact at most once at a time and saves through the
//!   right endpoint (process graphs included)
//!
//! # Example
//!
//! ```rust,ignore
//! use nova_core::{HttpBackend, Navigator, NovaConfig, Session, StateParams};
//!
//! # async fn example(services: nova_core::Services) -> Result<(), nova_core::NovaError> {
//! let navigator = Navigator::new(Session::new(services));
//! let outcome = navigator.navigate(StateParams::new("40")).await?;
//!
//! if let Some(artifact) = outcome.selected() {
//!     artifact.get_observable().await?;
//!     println!("opened {}", artifact.name());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod artifact_manager;
pub mod controller;
pub mod diagram;
pub mod error;
pub mod factory;
pub mod handle;
pub mod http;
pub mod item_state_service;
pub mod load_slot;
pub mod loading;
pub mod messages;
pub mod process_artifact;
pub mod process_sub_artifact;
pub mod processor;
pub mod selection;
pub mod services;
pub mod session;
pub mod stateful_artifact;
pub mod sub_artifact_collection;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use artifact_manager::ArtifactManager;
pub use controller::{ItemStateController, NavigationOutcome, Navigator};
pub use diagram::{CancellationToken, DiagramLoader};
pub use error::{HttpStatus, NovaError};
pub use factory::StatefulArtifactFactory;
pub use handle::ArtifactHandle;
pub use http::HttpBackend;
pub use item_state_service::{parse_item_id, ItemStateService};
pub use load_slot::{LoadFuture, LoadSlot};
pub use loading::LoadingScope;
pub use messages::{Localization, MessageKey, MessageLevel, UserMessage};
pub use process_artifact::StatefulProcessArtifact;
pub use process_sub_artifact::StatefulProcessSubArtifact;
pub use processor::ProcessModelProcessor;
pub use selection::SelectionManager;
pub use services::{
    ArtifactService, DiagramService, ItemInfoService, LoadingOverlayService, MessageService,
    NavigationService, ProcessService, ProjectManager, Services,
};
pub use session::Session;
pub use stateful_artifact::{ArtifactState, LockOwner, StatefulArtifact};
pub use sub_artifact_collection::{Keyed, SubArtifactCollection};
pub use types::{EditorTab, LoadingToken, NavigationTarget, NovaConfig, StateParams};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Nova Core
    pub use crate::{
        ArtifactHandle, ArtifactState, EditorTab, NavigationOutcome, Navigator, NovaConfig,
        NovaError, Services, Session, StateParams, StatefulArtifact, StatefulProcessArtifact,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
