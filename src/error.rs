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

//! Error types for the inference client library.
//!
//! This module defines [`Error`] -- the unified error type returned by all
//! fallible operations -- along with the [`Result`] type alias used throughout
//! the crate. [`RequestError`] is the cloneable failure status carried inside
//! a completed [`InferResult`](crate::infer::InferResult); every failure mode
//! is a recoverable value, never a process exit.

use crate::validate::ValidationError;

/// Convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may occur when communicating with an inference server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to establish or maintain a gRPC connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// The gRPC transport layer returned an error.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The server returned a gRPC status error.
    #[error("gRPC error (code={code}): {message}")]
    Grpc {
        /// The gRPC status code.
        code: tonic::Code,
        /// The error message from the server.
        message: String,
    },

    /// The request was cancelled before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// An inference input, request, or client option was constructed with
    /// invalid parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The response carries no output tensor with the requested name.
    #[error("no output named '{0}' in response")]
    OutputNotFound(String),

    /// A response tensor did not match what the caller expected.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// More completions were recorded than requests were submitted.
    #[error("completed {completed} requests but expected {expected}")]
    CompletionMismatch {
        /// The number of requests the waiter accounted for.
        expected: usize,
        /// The number of completions actually recorded.
        completed: usize,
    },

    /// The server returned a response that could not be interpreted.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Self::Grpc {
            code: status.code(),
            message: status.message().to_owned(),
        }
    }
}

/// Failure status attached to a completed request.
///
/// Unlike [`Error`] this type is `Clone`, so a failed
/// [`InferResult`](crate::infer::InferResult) can be copied out of the
/// result and moved across threads by the completion primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The server rejected or failed the request.
    #[error("request failed (code={code}): {message}")]
    Failed {
        /// The gRPC status code.
        code: tonic::Code,
        /// The error message from the server.
        message: String,
    },

    /// The request was cancelled before a response arrived.
    #[error("request cancelled")]
    Cancelled,
}

impl From<tonic::Status> for RequestError {
    fn from(status: tonic::Status) -> Self {
        Self::Failed {
            code: status.code(),
            message: status.message().to_owned(),
        }
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Failed { code, message } => Self::Grpc { code, message },
            RequestError::Cancelled => Self::Cancelled,
        }
    }
}
