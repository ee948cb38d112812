/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use seqfile_rs::prelude::*;
//! ```

// Files and their factory
pub use crate::sequential::{FactoryConfig, SequentialFile, SequentialFileFactory};

// Record encoding
pub use crate::sequential::EncodingSupport;

// Error reporting
pub use crate::sequential::{
    IoCriticalErrorListener, LoggingErrorListener, Operation, SequentialFileError,
    SharedErrorListener,
};

// Thread interrupts
pub use crate::sequential::{InterruptHandle, interrupt_current, interrupted, is_interrupted};
