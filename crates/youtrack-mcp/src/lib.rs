//! MCP server for YouTrack.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! YouTrack issue tracking to AI assistants over stdio.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for protocol handling and wraps the
//! `IssueTracker` trait from the `youtrack` crate, so it shares settings
//! resolution, request shaping and error messages with the `yt` CLI.
//!
//! # Tools
//!
//! ## Issues
//! - `list_issues`, `get_issue`, `create_issue`, `update_issue`, `delete_issue`
//! - `apply_command` - run a YouTrack command against an issue
//!
//! ## Issue Sub-resources
//! - `add_tag`, `remove_tag`, `list_tags`
//! - `add_comment`, `list_comments`
//! - `link_issues`, `list_links`
//! - `add_work_item`, `list_work_items`
//! - `upload_attachment`, `list_attachments`
//!
//! ## Directory
//! - `list_projects`, `get_project`
//! - `list_users`, `get_user`, `current_user`
//! - `connection_info` - show which server and account are in use

pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::YouTrackMcpServer;
