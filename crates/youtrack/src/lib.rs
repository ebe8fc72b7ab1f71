//! YouTrack - a command-line client and library for the YouTrack REST API.
//!
//! This crate provides both the `yt` CLI application and a library that the
//! MCP server builds on: domain models, a REST client behind the
//! [`client::IssueTracker`] trait, layered configuration and text/JSON output.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod client;
pub mod command;
pub mod config;
pub mod domain;
pub mod duration;
pub mod error;

// Public CLI modules (needed by binary)
pub mod app;
pub mod cli;
pub mod output;
