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

//! Builder types for constructing inference requests and processing results.
//!
//! The main entry points are [`InferInput`] for describing input tensors,
//! [`InferRequestBuilder`] for assembling a complete [`InferRequest`], and
//! [`InferResult`] -- the owned outcome of a request, produced by both the
//! synchronous and the asynchronous flow.
//!
//! # Example
//!
//! ```rust
//! use infer_client::infer::{DataType, InferInput, InferRequestBuilder};
//!
//! let input = InferInput::new("INPUT0", vec![1, 16], DataType::Int32)
//!     .with_data(&[0_i32; 16]);
//!
//! let request = InferRequestBuilder::new("simple")
//!     .model_version("1")
//!     .request_id("req-001")
//!     .input(input)
//!     .output("OUTPUT0")
//!     .build();
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Error, RequestError, Result};
use crate::generated::inference;

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Tensor data types of the inference protocol.
///
/// These map to the string representations carried on the wire
/// (e.g. `"FP32"`, `"INT64"`, `"BYTES"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean values.
    Bool,
    /// Unsigned 8-bit integers.
    Uint8,
    /// Unsigned 16-bit integers.
    Uint16,
    /// Unsigned 32-bit integers.
    Uint32,
    /// Unsigned 64-bit integers.
    Uint64,
    /// Signed 8-bit integers.
    Int8,
    /// Signed 16-bit integers.
    Int16,
    /// Signed 32-bit integers.
    Int32,
    /// Signed 64-bit integers.
    Int64,
    /// IEEE 754 half-precision (16-bit) floating point.
    Fp16,
    /// IEEE 754 single-precision (32-bit) floating point.
    Fp32,
    /// IEEE 754 double-precision (64-bit) floating point.
    Fp64,
    /// Variable-length byte sequences (strings).
    Bytes,
    /// Brain floating point (16-bit).
    Bf16,
}

impl DataType {
    /// Returns the protocol string representation of this data type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use infer_client::infer::DataType;
    /// assert_eq!(DataType::Fp32.as_str(), "FP32");
    /// assert_eq!(DataType::Int64.as_str(), "INT64");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Uint8 => "UINT8",
            Self::Uint16 => "UINT16",
            Self::Uint32 => "UINT32",
            Self::Uint64 => "UINT64",
            Self::Int8 => "INT8",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Fp16 => "FP16",
            Self::Fp32 => "FP32",
            Self::Fp64 => "FP64",
            Self::Bytes => "BYTES",
            Self::Bf16 => "BF16",
        }
    }

    /// Parses a protocol data type string into a [`DataType`].
    ///
    /// Returns `None` if the string does not correspond to a known type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use infer_client::infer::DataType;
    /// assert_eq!(DataType::parse("FP32"), Some(DataType::Fp32));
    /// assert_eq!(DataType::parse("UNKNOWN"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOOL" => Some(Self::Bool),
            "UINT8" => Some(Self::Uint8),
            "UINT16" => Some(Self::Uint16),
            "UINT32" => Some(Self::Uint32),
            "UINT64" => Some(Self::Uint64),
            "INT8" => Some(Self::Int8),
            "INT16" => Some(Self::Int16),
            "INT32" => Some(Self::Int32),
            "INT64" => Some(Self::Int64),
            "FP16" => Some(Self::Fp16),
            "FP32" => Some(Self::Fp32),
            "FP64" => Some(Self::Fp64),
            "BYTES" => Some(Self::Bytes),
            "BF16" => Some(Self::Bf16),
            _ => None,
        }
    }

    /// Returns the size in bytes of one element of this type, or `None` for
    /// variable-length types.
    ///
    /// # Example
    ///
    /// ```rust
    /// use infer_client::infer::DataType;
    /// assert_eq!(DataType::Int32.element_size(), Some(4));
    /// assert_eq!(DataType::Bytes.element_size(), None);
    /// ```
    #[must_use]
    pub const fn element_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Uint8 | Self::Int8 => Some(1),
            Self::Uint16 | Self::Int16 | Self::Fp16 | Self::Bf16 => Some(2),
            Self::Uint32 | Self::Int32 | Self::Fp32 => Some(4),
            Self::Uint64 | Self::Int64 | Self::Fp64 => Some(8),
            Self::Bytes => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown data type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDataTypeError(String);

impl std::fmt::Display for ParseDataTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown tensor data type: {}", self.0)
    }
}

impl std::error::Error for ParseDataTypeError {}

impl std::str::FromStr for DataType {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DataType::parse(s).ok_or_else(|| ParseDataTypeError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// TensorElement
// ---------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
}

/// A native Rust type that can be carried as tensor elements.
///
/// Ties the element type to its wire datatype and its fixed-width
/// little-endian encoding. Implemented for `bool` and the integer and
/// floating-point primitives; `FP16`, `BF16`, and `BYTES` tensors have no
/// native element type and travel through
/// [`InferInput::with_data_raw`] / [`InferInput::with_data_bytes`] instead.
///
/// This trait is sealed and cannot be implemented outside the crate.
pub trait TensorElement: sealed::Sealed + Copy {
    /// The wire datatype matching this element type.
    const DATATYPE: DataType;

    /// Encoded size of one element in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Appends the little-endian encoding of `self` to `buf`.
    fn write_le(self, buf: &mut Vec<u8>);

    /// Decodes one element from a little-endian chunk of exactly
    /// [`SIZE`](Self::SIZE) bytes.
    fn read_le(chunk: &[u8]) -> Self;
}

impl sealed::Sealed for bool {}

impl TensorElement for bool {
    const DATATYPE: DataType = DataType::Bool;

    fn write_le(self, buf: &mut Vec<u8>) {
        buf.push(u8::from(self));
    }

    fn read_le(chunk: &[u8]) -> Self {
        chunk[0] != 0
    }
}

macro_rules! tensor_element {
    ($($ty:ty => $datatype:expr),+ $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl TensorElement for $ty {
                const DATATYPE: DataType = $datatype;

                fn write_le(self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(chunk: &[u8]) -> Self {
                    // chunks_exact guarantees the length.
                    Self::from_le_bytes(chunk.try_into().unwrap())
                }
            }
        )+
    };
}

tensor_element! {
    u8 => DataType::Uint8,
    u16 => DataType::Uint16,
    u32 => DataType::Uint32,
    u64 => DataType::Uint64,
    i8 => DataType::Int8,
    i16 => DataType::Int16,
    i32 => DataType::Int32,
    i64 => DataType::Int64,
    f32 => DataType::Fp32,
    f64 => DataType::Fp64,
}

// ---------------------------------------------------------------------------
// InferInput
// ---------------------------------------------------------------------------

/// Describes an input tensor for an inference request.
///
/// Use [`with_data`](Self::with_data) to attach tensor data; it is encoded
/// as raw little-endian bytes and travels in `raw_input_contents` for
/// maximum efficiency over gRPC.
///
/// # Example
///
/// ```rust
/// use infer_client::infer::{DataType, InferInput};
///
/// let input = InferInput::new("images", vec![1, 3, 224, 224], DataType::Fp32)
///     .with_data(&vec![0.0_f32; 3 * 224 * 224]);
/// ```
#[derive(Debug, Clone)]
pub struct InferInput {
    name: String,
    shape: Vec<i64>,
    datatype: DataType,
    data: Option<Vec<u8>>,
    parameters: HashMap<String, inference::InferParameter>,
}

impl InferInput {
    /// Creates a new inference input descriptor.
    ///
    /// # Arguments
    ///
    /// * `name` -- The tensor name as defined in the model configuration.
    /// * `shape` -- The shape of the tensor (e.g. `vec![1, 16]`).
    /// * `datatype` -- The element data type.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Vec<i64>, datatype: DataType) -> Self {
        Self {
            name: name.into(),
            shape,
            datatype,
            data: None,
            parameters: HashMap::new(),
        }
    }

    /// Attaches tensor data, encoding each element little-endian.
    ///
    /// The element type determines only the wire encoding; the tensor
    /// datatype remains whatever was passed to [`new`](Self::new), so the
    /// caller is responsible for keeping the two consistent.
    #[must_use]
    pub fn with_data<T: TensorElement>(self, data: &[T]) -> Self {
        let mut raw = Vec::with_capacity(data.len() * T::SIZE);
        for &value in data {
            value.write_le(&mut raw);
        }
        Self {
            data: Some(raw),
            ..self
        }
    }

    /// Attaches raw byte data.
    ///
    /// This is the most general form and can be used for any data type,
    /// including FP16 and BF16 which lack native Rust types. The caller
    /// is responsible for ensuring the bytes are in the correct format
    /// (little-endian, row-major order).
    #[must_use]
    pub fn with_data_raw(self, data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            ..self
        }
    }

    /// Attaches variable-length byte sequences (strings).
    ///
    /// Each byte slice is prepended with its 4-byte little-endian length,
    /// following the protocol's BYTES tensor encoding.
    #[must_use]
    pub fn with_data_bytes(self, data: &[&[u8]]) -> Self {
        let mut raw = Vec::new();
        for item in data {
            let len = u32::try_from(item.len()).expect("byte sequence length exceeds u32::MAX");
            raw.extend_from_slice(&len.to_le_bytes());
            raw.extend_from_slice(item);
        }
        Self {
            data: Some(raw),
            ..self
        }
    }

    /// Adds a string parameter to this input tensor.
    #[must_use]
    pub fn with_string_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::StringParam(
                    value.into(),
                )),
            },
        );
        self
    }

    /// Adds an integer parameter to this input tensor.
    #[must_use]
    pub fn with_int_parameter(mut self, key: impl Into<String>, value: i64) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::Int64Param(
                    value,
                )),
            },
        );
        self
    }

    /// Adds a boolean parameter to this input tensor.
    #[must_use]
    pub fn with_bool_parameter(mut self, key: impl Into<String>, value: bool) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::BoolParam(
                    value,
                )),
            },
        );
        self
    }

    /// Returns the tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tensor shape.
    #[must_use]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Returns the tensor data type.
    #[must_use]
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Converts this input into the protobuf tensor and optional raw bytes.
    pub(crate) fn into_proto(
        self,
    ) -> (
        inference::model_infer_request::InferInputTensor,
        Option<Vec<u8>>,
    ) {
        let tensor = inference::model_infer_request::InferInputTensor {
            name: self.name,
            datatype: self.datatype.as_str().to_owned(),
            shape: self.shape,
            parameters: self.parameters,
            contents: None, // We use raw_input_contents for performance.
        };
        (tensor, self.data)
    }
}

// ---------------------------------------------------------------------------
// InferRequestedOutput
// ---------------------------------------------------------------------------

/// Describes a requested output tensor for an inference request.
///
/// Specifying outputs is optional. When no outputs are requested, the server
/// returns all outputs defined in the model configuration.
#[derive(Debug, Clone)]
pub struct InferRequestedOutput {
    name: String,
    parameters: HashMap<String, inference::InferParameter>,
}

impl InferRequestedOutput {
    /// Creates a new requested output for the tensor with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: HashMap::new(),
        }
    }

    /// Adds a string parameter to this output request.
    #[must_use]
    pub fn with_string_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::StringParam(
                    value.into(),
                )),
            },
        );
        self
    }

    /// Returns the output tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Converts this output descriptor into the protobuf type.
    pub(crate) fn into_proto(self) -> inference::model_infer_request::InferRequestedOutputTensor {
        inference::model_infer_request::InferRequestedOutputTensor {
            name: self.name,
            parameters: self.parameters,
        }
    }
}

// ---------------------------------------------------------------------------
// InferRequestBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing [`InferRequest`] values.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infer_client::infer::{DataType, InferInput, InferRequestBuilder};
///
/// let request = InferRequestBuilder::new("simple")
///     .model_version("1")
///     .request_id("batch-001")
///     .timeout(Duration::from_millis(500))
///     .input(
///         InferInput::new("INPUT0", vec![1, 16], DataType::Int32)
///             .with_data(&[0_i32; 16]),
///     )
///     .output("OUTPUT0")
///     .build();
/// ```
#[derive(Debug)]
pub struct InferRequestBuilder {
    model_name: String,
    model_version: String,
    request_id: String,
    timeout: Option<Duration>,
    inputs: Vec<InferInput>,
    outputs: Vec<InferRequestedOutput>,
    parameters: HashMap<String, inference::InferParameter>,
}

impl InferRequestBuilder {
    /// Creates a new builder targeting the specified model.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: String::new(),
            request_id: String::new(),
            timeout: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: HashMap::new(),
        }
    }

    /// Sets the model version to use for inference.
    ///
    /// If not set, the server uses the latest version according to its policy.
    #[must_use]
    pub fn model_version(self, version: impl Into<String>) -> Self {
        Self {
            model_version: version.into(),
            ..self
        }
    }

    /// Sets an optional request identifier.
    ///
    /// When specified, the server echoes this identifier in the response.
    #[must_use]
    pub fn request_id(self, id: impl Into<String>) -> Self {
        Self {
            request_id: id.into(),
            ..self
        }
    }

    /// Sets the deadline for this request.
    ///
    /// The timeout is enforced by the transport: it travels as the
    /// `grpc-timeout` header and the channel abandons the call once it
    /// expires. Without a timeout the request may wait indefinitely.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Adds an input tensor to the request.
    #[must_use]
    pub fn input(mut self, input: InferInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Adds multiple input tensors to the request.
    #[must_use]
    pub fn inputs(mut self, inputs: impl IntoIterator<Item = InferInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Adds a requested output by name.
    ///
    /// This is a convenience method that creates an [`InferRequestedOutput`]
    /// with no additional parameters.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(InferRequestedOutput::new(name));
        self
    }

    /// Adds a fully-configured requested output.
    #[must_use]
    pub fn output_with(mut self, output: InferRequestedOutput) -> Self {
        self.outputs.push(output);
        self
    }

    /// Adds a string inference parameter.
    #[must_use]
    pub fn string_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::StringParam(
                    value.into(),
                )),
            },
        );
        self
    }

    /// Adds an integer inference parameter.
    #[must_use]
    pub fn int_parameter(mut self, key: impl Into<String>, value: i64) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::Int64Param(
                    value,
                )),
            },
        );
        self
    }

    /// Adds a boolean inference parameter.
    #[must_use]
    pub fn bool_parameter(mut self, key: impl Into<String>, value: bool) -> Self {
        self.parameters.insert(
            key.into(),
            inference::InferParameter {
                parameter_choice: Some(inference::infer_parameter::ParameterChoice::BoolParam(
                    value,
                )),
            },
        );
        self
    }

    /// Consumes the builder and produces an immutable [`InferRequest`].
    ///
    /// Input data is placed into `raw_input_contents` for optimal
    /// performance over gRPC, following the protocol recommendation.
    #[must_use]
    pub fn build(self) -> InferRequest {
        let mut input_tensors = Vec::with_capacity(self.inputs.len());
        let mut raw_input_contents = Vec::with_capacity(self.inputs.len());

        for input in self.inputs {
            let (tensor, raw_data) = input.into_proto();
            input_tensors.push(tensor);
            raw_input_contents.push(raw_data.unwrap_or_default());
        }

        let output_tensors: Vec<_> = self
            .outputs
            .into_iter()
            .map(InferRequestedOutput::into_proto)
            .collect();

        InferRequest {
            message: inference::ModelInferRequest {
                model_name: self.model_name,
                model_version: self.model_version,
                id: self.request_id,
                parameters: self.parameters,
                inputs: input_tensors,
                outputs: output_tensors,
                raw_input_contents,
            },
            timeout: self.timeout,
        }
    }
}

// ---------------------------------------------------------------------------
// InferRequest
// ---------------------------------------------------------------------------

/// An immutable, ready-to-send inference request.
///
/// Cloning is supported so the same request can be submitted repeatedly,
/// e.g. when exercising concurrent asynchronous inference.
#[derive(Debug, Clone)]
pub struct InferRequest {
    pub(crate) message: inference::ModelInferRequest,
    pub(crate) timeout: Option<Duration>,
}

impl InferRequest {
    /// Returns the target model name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.message.model_name
    }

    /// Returns the request identifier, if one was set.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.message.id
    }

    /// Returns the transport-enforced deadline, if one was set.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Consumes this request and returns the underlying protobuf message.
    #[must_use]
    pub fn into_inner(self) -> inference::ModelInferRequest {
        self.message
    }
}

// ---------------------------------------------------------------------------
// InferResult
// ---------------------------------------------------------------------------

/// The outcome of a single inference request.
///
/// Both [`infer`](crate::client::InferenceClient::infer) and the completion
/// handler of [`async_infer`](crate::client::InferenceClient::async_infer)
/// produce an `InferResult`. The result owns the response payload and may be
/// moved freely across threads; output accessors are keyed by tensor name.
///
/// A result whose [`status`](Self::status) is a failure carries no payload:
/// every accessor returns an error rather than data.
#[derive(Debug, Clone)]
pub struct InferResult {
    outcome: std::result::Result<inference::ModelInferResponse, RequestError>,
}

impl InferResult {
    /// Wraps a raw protobuf response as a successful result.
    ///
    /// This is useful for testing or when constructing results from raw
    /// protobuf data obtained outside of the normal client flow.
    #[must_use]
    pub fn from_response(response: inference::ModelInferResponse) -> Self {
        Self {
            outcome: Ok(response),
        }
    }

    /// Wraps a request failure as a result carrying only a status.
    #[must_use]
    pub fn from_error(error: RequestError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// Returns the request status: `Ok(())` when a response arrived,
    /// otherwise the failure that ended the request.
    ///
    /// # Errors
    ///
    /// Returns the [`RequestError`] recorded for a failed or cancelled
    /// request.
    pub fn status(&self) -> std::result::Result<(), RequestError> {
        match &self.outcome {
            Ok(_) => Ok(()),
            Err(err) => Err(err.clone()),
        }
    }

    /// True when the request completed with a response.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    fn response(&self) -> Result<&inference::ModelInferResponse> {
        match &self.outcome {
            Ok(response) => Ok(response),
            Err(err) => Err(Error::from(err.clone())),
        }
    }

    fn output(
        &self,
        name: &str,
    ) -> Result<(usize, &inference::model_infer_response::InferOutputTensor)> {
        let response = self.response()?;
        let index = response
            .outputs
            .iter()
            .position(|output| output.name == name)
            .ok_or_else(|| Error::OutputNotFound(name.to_owned()))?;
        Ok((index, &response.outputs[index]))
    }

    /// Returns the model name that produced this response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed.
    pub fn model_name(&self) -> Result<&str> {
        Ok(&self.response()?.model_name)
    }

    /// Returns the model version that produced this response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed.
    pub fn model_version(&self) -> Result<&str> {
        Ok(&self.response()?.model_version)
    }

    /// Returns the request identifier echoed by the server, if one was set
    /// in the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed.
    pub fn id(&self) -> Result<&str> {
        Ok(&self.response()?.id)
    }

    /// Returns the list of output tensors in the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed.
    pub fn outputs(&self) -> Result<&[inference::model_infer_response::InferOutputTensor]> {
        Ok(&self.response()?.outputs)
    }

    /// Returns the shape of the named output tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed or no output has this name.
    pub fn shape(&self, name: &str) -> Result<&[i64]> {
        let (_, tensor) = self.output(name)?;
        Ok(&tensor.shape)
    }

    /// Returns the datatype string of the named output tensor
    /// (e.g. `"INT32"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed or no output has this name.
    pub fn datatype(&self, name: &str) -> Result<&str> {
        let (_, tensor) = self.output(name)?;
        Ok(&tensor.datatype)
    }

    /// Returns a borrowed view of the raw bytes of the named output tensor.
    ///
    /// The raw buffers correspond 1-to-1 with the output tensors, in order;
    /// ownership stays with the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed, no output has this name, or
    /// the response carries fewer raw buffers than output tensors.
    pub fn raw_bytes(&self, name: &str) -> Result<&[u8]> {
        let (index, _) = self.output(name)?;
        let response = self.response()?;
        response
            .raw_output_contents
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                Error::UnexpectedResponse(format!(
                    "response has {} raw buffers but output '{name}' is at index {index}",
                    response.raw_output_contents.len()
                ))
            })
    }

    /// Decodes the named output tensor into a vector of native elements.
    ///
    /// The declared datatype of the output must match `T`, so an `INT32`
    /// tensor decodes with `output_as::<i32>` and so on.
    ///
    /// # Errors
    ///
    /// Returns an error if the request failed, no output has this name, the
    /// declared datatype does not match `T`, or the raw byte length is not
    /// a multiple of the element size.
    pub fn output_as<T: TensorElement>(&self, name: &str) -> Result<Vec<T>> {
        let (_, tensor) = self.output(name)?;
        if tensor.datatype != T::DATATYPE.as_str() {
            return Err(Error::InvalidInput(format!(
                "output '{name}' holds {} data, not {}",
                tensor.datatype,
                T::DATATYPE
            )));
        }
        let raw = self.raw_bytes(name)?;
        if raw.len() % T::SIZE != 0 {
            return Err(Error::UnexpectedResponse(format!(
                "output '{name}' has {} bytes, not a multiple of {}",
                raw.len(),
                T::SIZE
            )));
        }
        Ok(raw.chunks_exact(T::SIZE).map(T::read_le).collect())
    }

    /// Consumes this result and returns the underlying protobuf response.
    ///
    /// # Errors
    ///
    /// Returns the recorded failure if the request did not complete with a
    /// response.
    pub fn into_inner(self) -> Result<inference::ModelInferResponse> {
        self.outcome.map_err(Error::from)
    }
}

// ---------------------------------------------------------------------------
// Response wrapper types
// ---------------------------------------------------------------------------

/// Metadata about the inference server.
#[derive(Debug, Clone)]
pub struct ServerMetadata {
    /// The server name.
    pub name: String,
    /// The server version.
    pub version: String,
    /// The protocol extensions supported by the server.
    pub extensions: Vec<String>,
}

/// Metadata about a specific model hosted on the server.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// The model name.
    pub name: String,
    /// The available model versions.
    pub versions: Vec<String>,
    /// The model platform (e.g. `"tensorrt_plan"`, `"onnxruntime_onnx"`).
    pub platform: String,
    /// Input tensor metadata.
    pub inputs: Vec<TensorMetadata>,
    /// Output tensor metadata.
    pub outputs: Vec<TensorMetadata>,
}

/// Metadata for a single tensor (input or output).
#[derive(Debug, Clone)]
pub struct TensorMetadata {
    /// The tensor name.
    pub name: String,
    /// The tensor data type as a string (e.g. `"FP32"`, `"INT64"`).
    pub datatype: String,
    /// The tensor shape. Variable-size dimensions are represented as `-1`.
    pub shape: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_output(
        name: &str,
        datatype: &str,
        shape: Vec<i64>,
        raw: Vec<u8>,
    ) -> inference::ModelInferResponse {
        inference::ModelInferResponse {
            model_name: "test_model".into(),
            model_version: "1".into(),
            id: "req-001".into(),
            parameters: Default::default(),
            outputs: vec![inference::model_infer_response::InferOutputTensor {
                name: name.into(),
                datatype: datatype.into(),
                shape,
                parameters: Default::default(),
                contents: None,
            }],
            raw_output_contents: vec![raw],
        }
    }

    #[test]
    fn data_type_round_trip() {
        let types = [
            DataType::Bool,
            DataType::Uint8,
            DataType::Uint16,
            DataType::Uint32,
            DataType::Uint64,
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::Fp16,
            DataType::Fp32,
            DataType::Fp64,
            DataType::Bytes,
            DataType::Bf16,
        ];
        for dt in &types {
            let s = dt.as_str();
            let parsed = DataType::parse(s).unwrap();
            assert_eq!(*dt, parsed, "Round-trip failed for {s}");
        }
    }

    #[test]
    fn data_type_element_sizes() {
        assert_eq!(DataType::Bool.element_size(), Some(1));
        assert_eq!(DataType::Int16.element_size(), Some(2));
        assert_eq!(DataType::Fp16.element_size(), Some(2));
        assert_eq!(DataType::Int32.element_size(), Some(4));
        assert_eq!(DataType::Fp64.element_size(), Some(8));
        assert_eq!(DataType::Bytes.element_size(), None);
    }

    #[test]
    fn data_type_unknown_returns_none() {
        assert!(DataType::parse("UNKNOWN").is_none());
        assert!(DataType::parse("").is_none());
    }

    #[test]
    fn tensor_element_datatypes_match_sizes() {
        assert_eq!(<i32 as TensorElement>::DATATYPE, DataType::Int32);
        assert_eq!(<i32 as TensorElement>::SIZE, 4);
        assert_eq!(<f64 as TensorElement>::DATATYPE, DataType::Fp64);
        assert_eq!(<f64 as TensorElement>::SIZE, 8);
        assert_eq!(<bool as TensorElement>::SIZE, 1);
    }

    #[test]
    fn infer_input_with_f32_data() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0];
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32).with_data(&data);

        assert_eq!(input.name(), "input0");
        assert_eq!(input.shape(), &[1, 4]);
        assert_eq!(input.datatype(), DataType::Fp32);

        let raw = input.data.as_ref().unwrap();
        assert_eq!(raw.len(), 16); // 4 floats * 4 bytes
        assert_eq!(&raw[..4], &1.0f32.to_le_bytes());
    }

    #[test]
    fn infer_input_with_i32_data() {
        let data = vec![-1i32, 0, 1, i32::MAX];
        let input = InferInput::new("ids", vec![1, 4], DataType::Int32).with_data(&data);

        let raw = input.data.as_ref().unwrap();
        assert_eq!(raw.len(), 16); // 4 ints * 4 bytes
        assert_eq!(&raw[..4], &(-1i32).to_le_bytes());
    }

    #[test]
    fn infer_input_with_bool_data() {
        let data = vec![true, false, true];
        let input = InferInput::new("mask", vec![1, 3], DataType::Bool).with_data(&data);

        let raw = input.data.as_ref().unwrap();
        assert_eq!(raw, &[1, 0, 1]);
    }

    #[test]
    fn infer_input_with_bytes_data() {
        let strings: Vec<&[u8]> = vec![b"hello", b"world"];
        let input = InferInput::new("text", vec![1, 2], DataType::Bytes).with_data_bytes(&strings);

        let raw = input.data.as_ref().unwrap();
        // "hello" = 4-byte length (5) + 5 bytes = 9 bytes
        // "world" = 4-byte length (5) + 5 bytes = 9 bytes
        assert_eq!(raw.len(), 18);
        // Check length prefix for first string
        assert_eq!(&raw[..4], &5u32.to_le_bytes());
    }

    #[test]
    fn infer_input_with_parameters() {
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32)
            .with_string_parameter("key", "value")
            .with_int_parameter("count", 42)
            .with_bool_parameter("flag", true);

        let (tensor, _) = input.into_proto();
        assert_eq!(tensor.parameters.len(), 3);
    }

    #[test]
    fn infer_request_builder_basic() {
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32).with_data(&[1.0f32; 4]);

        let request = InferRequestBuilder::new("my_model")
            .model_version("1")
            .request_id("test-001")
            .input(input)
            .output("output0")
            .build();

        assert_eq!(request.model_name(), "my_model");
        assert_eq!(request.id(), "test-001");
        assert_eq!(request.timeout(), None);

        let message = request.into_inner();
        assert_eq!(message.model_version, "1");
        assert_eq!(message.inputs.len(), 1);
        assert_eq!(message.outputs.len(), 1);
        assert_eq!(message.raw_input_contents.len(), 1);
        assert_eq!(message.raw_input_contents[0].len(), 16); // 4 * f32
    }

    #[test]
    fn infer_request_builder_timeout() {
        let request = InferRequestBuilder::new("model")
            .timeout(Duration::from_micros(1500))
            .build();

        assert_eq!(request.timeout(), Some(Duration::from_micros(1500)));
    }

    #[test]
    fn infer_request_builder_multiple_inputs() {
        let input1 = InferInput::new("input0", vec![1, 4], DataType::Fp32).with_data(&[1.0f32; 4]);
        let input2 = InferInput::new("input1", vec![1, 2], DataType::Int64).with_data(&[1i64, 2]);

        let request = InferRequestBuilder::new("multi_input_model")
            .inputs(vec![input1, input2])
            .output("output0")
            .output("output1")
            .build();

        let message = request.into_inner();
        assert_eq!(message.inputs.len(), 2);
        assert_eq!(message.outputs.len(), 2);
        assert_eq!(message.raw_input_contents.len(), 2);
    }

    #[test]
    fn infer_request_builder_with_parameters() {
        let request = InferRequestBuilder::new("model")
            .string_parameter("sequence_id", "abc")
            .int_parameter("priority", 1)
            .bool_parameter("sequence_start", true)
            .build();

        assert_eq!(request.into_inner().parameters.len(), 3);
    }

    #[test]
    fn infer_request_builder_no_data() {
        let input = InferInput::new("input0", vec![1, 4], DataType::Fp32);

        let request = InferRequestBuilder::new("model").input(input).build();

        // raw_input_contents should have an empty entry.
        let message = request.into_inner();
        assert_eq!(message.raw_input_contents.len(), 1);
        assert!(message.raw_input_contents[0].is_empty());
    }

    #[test]
    fn infer_result_accessors() {
        let values = vec![1.5f32, 2.5, -3.0, 0.0];
        let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let result =
            InferResult::from_response(response_with_output("output0", "FP32", vec![1, 4], raw));

        assert!(result.is_ok());
        assert!(result.status().is_ok());
        assert_eq!(result.model_name().unwrap(), "test_model");
        assert_eq!(result.model_version().unwrap(), "1");
        assert_eq!(result.id().unwrap(), "req-001");
        assert_eq!(result.shape("output0").unwrap(), &[1, 4]);
        assert_eq!(result.datatype("output0").unwrap(), "FP32");
        assert_eq!(result.raw_bytes("output0").unwrap().len(), 16);
        assert_eq!(result.output_as::<f32>("output0").unwrap(), values);
    }

    #[test]
    fn infer_result_unknown_output_name() {
        let result =
            InferResult::from_response(response_with_output("alpha", "INT32", vec![1], vec![0; 4]));

        assert!(matches!(
            result.shape("beta"),
            Err(Error::OutputNotFound(name)) if name == "beta"
        ));
        assert!(result.raw_bytes("beta").is_err());
        assert!(result.output_as::<i32>("beta").is_err());
    }

    #[test]
    fn infer_result_datatype_mismatch_refuses_decode() {
        let result = InferResult::from_response(response_with_output(
            "out",
            "INT32",
            vec![1, 2],
            vec![0; 8],
        ));

        assert!(result.output_as::<i32>("out").is_ok());
        assert!(matches!(
            result.output_as::<f32>("out"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn infer_result_irregular_byte_length() {
        // 3 bytes cannot hold INT32 elements.
        let result = InferResult::from_response(response_with_output(
            "out",
            "INT32",
            vec![3],
            vec![0, 1, 2],
        ));

        assert!(matches!(
            result.output_as::<i32>("out"),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn infer_result_missing_raw_buffer() {
        let mut response = response_with_output("out", "INT32", vec![1], vec![0; 4]);
        response.raw_output_contents.clear();
        let result = InferResult::from_response(response);

        // The tensor is declared but its raw buffer is absent.
        assert!(matches!(
            result.raw_bytes("out"),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn failed_result_refuses_every_accessor() {
        let result = InferResult::from_error(RequestError::Failed {
            code: tonic::Code::Internal,
            message: "model exploded".into(),
        });

        assert!(!result.is_ok());
        assert!(matches!(
            result.status(),
            Err(RequestError::Failed { code, .. }) if code == tonic::Code::Internal
        ));
        assert!(result.model_name().is_err());
        assert!(result.id().is_err());
        assert!(result.outputs().is_err());
        assert!(result.shape("OUTPUT0").is_err());
        assert!(result.datatype("OUTPUT0").is_err());
        assert!(result.raw_bytes("OUTPUT0").is_err());
        assert!(result.output_as::<i32>("OUTPUT0").is_err());
        assert!(result.into_inner().is_err());
    }

    #[test]
    fn cancelled_result_maps_to_cancelled_error() {
        let result = InferResult::from_error(RequestError::Cancelled);

        assert_eq!(result.status(), Err(RequestError::Cancelled));
        assert!(matches!(result.shape("x"), Err(Error::Cancelled)));
    }

    #[test]
    fn requested_output_with_parameters() {
        let output =
            InferRequestedOutput::new("output0").with_string_parameter("classification", "3");

        assert_eq!(output.name(), "output0");

        let proto = output.into_proto();
        assert_eq!(proto.parameters.len(), 1);
    }
}
