//! Limits and constraints for description processing
//!
//! This module defines limits that keep hostile or broken inputs from
//! exhausting resources: oversized documents, deeply nested trees and
//! runaway import chains.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_xml_depth: usize,

    /// Maximum document size in bytes
    pub max_document_size: usize,

    /// Maximum length of an import chain
    pub max_import_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_document_size: 100 * 1024 * 1024, // 100 MB
            max_import_depth: 64,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_document_size: 10 * 1024 * 1024, // 10 MB
            max_import_depth: 8,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_document_size: 1024 * 1024 * 1024, // 1 GB
            max_import_depth: 1024,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::parser(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a document size is within limits
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_size {
            Err(Error::other(format!(
                "Document size {} bytes exceeds maximum {} bytes",
                size, self.max_document_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if an import chain is within limits
    pub fn check_import_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_import_depth {
            Err(Error::other(format!(
                "Import depth {} exceeds maximum {}",
                depth, self.max_import_depth
            )))
        } else {
            Ok(())
        }
    }
}
