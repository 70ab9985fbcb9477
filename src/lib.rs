// Copyright 2024-2026, NVIDIA CORPORATION & AFFILIATES. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
//  * Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
//  * Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//  * Neither the name of NVIDIA CORPORATION nor the names of its
//    contributors may be used to endorse or promote products derived
//    from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS ``AS IS'' AND ANY
// EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED.  IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY
// OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Rust client library for KServe-v2-protocol inference servers.
//!
//! This crate provides a type-safe, async Rust API for communicating with
//! inference servers that speak the KServe v2 gRPC protocol, such as
//! [NVIDIA Triton](https://github.com/triton-inference-server/server). It
//! wraps the gRPC protocol with ergonomic builder patterns and strong
//! typing while providing zero-cost access to the underlying protobuf types
//! when needed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use infer_client::client::InferenceClient;
//! use infer_client::infer::{DataType, InferInput, InferRequestBuilder};
//!
//! # async fn example() -> infer_client::error::Result<()> {
//! // Connect to the server
//! let client = InferenceClient::connect("http://localhost:8001").await?;
//!
//! // Check server health
//! assert!(client.is_server_live().await?);
//! assert!(client.is_server_ready().await?);
//!
//! // Build an inference request
//! let input = InferInput::new("INPUT0", vec![1, 16], DataType::Int32)
//!     .with_data(&[0_i32; 16]);
//!
//! let request = InferRequestBuilder::new("simple")
//!     .model_version("1")
//!     .input(input)
//!     .output("OUTPUT0")
//!     .build();
//!
//! // Run inference
//! let result = client.infer(request).await?;
//! let output_data = result.output_as::<i32>("OUTPUT0")?;
//! println!("Output: {:?}", output_data);
//! # Ok(())
//! # }
//! ```
//!
//! # Asynchronous inference
//!
//! [`async_infer`](client::InferenceClient::async_infer) starts a request
//! and invokes a completion handler when it finishes. The
//! [`completion`] module provides the blocking primitives that carry
//! results from handlers back to waiting threads:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use infer_client::client::InferenceClient;
//! use infer_client::completion::CompletionBarrier;
//! use infer_client::infer::{DataType, InferInput, InferRequestBuilder};
//!
//! # async fn example() -> infer_client::error::Result<()> {
//! let client = InferenceClient::connect("http://localhost:8001").await?;
//! let barrier = Arc::new(CompletionBarrier::new());
//!
//! for _ in 0..4 {
//!     let request = InferRequestBuilder::new("simple")
//!         .input(
//!             InferInput::new("INPUT0", vec![1, 16], DataType::Int32)
//!                 .with_data(&[0_i32; 16]),
//!         )
//!         .build();
//!     let barrier = Arc::clone(&barrier);
//!     client.async_infer(request, move |_result| barrier.arrive());
//! }
//!
//! // Block until all four completion handlers have run.
//! barrier.wait_exact(4)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`client`] -- The main [`InferenceClient`](client::InferenceClient)
//!   and connection options.
//! - [`infer`] -- Builder types for inference requests and the
//!   [`InferResult`](infer::InferResult) response wrapper.
//! - [`completion`] -- Blocking synchronization between completion handlers
//!   and waiting threads.
//! - [`validate`] -- Structural validation of response tensors.
//! - [`error`] -- Error types and the [`Result`](error::Result) alias.
//! - [`generated`] -- Raw protobuf/gRPC generated types for advanced usage.

pub mod client;
pub mod completion;
pub mod error;
pub mod generated;
pub mod infer;
pub mod validate;

/// Re-export of the main client type for convenience.
pub use client::InferenceClient;
