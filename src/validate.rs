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

//! Structural validation of inference responses.
//!
//! An [`OutputExpectation`] records the shape and datatype an output tensor
//! must have; [`validate`](OutputExpectation::validate) checks a received
//! [`InferResult`] against it, including the raw byte size implied by the
//! shape. Validation reports the first discrepancy it finds and never
//! inspects element values -- numerical checks belong to the caller.

use crate::error::Result;
use crate::infer::{DataType, InferResult};

/// A discrepancy between an expected output tensor and the response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The response carries no output tensor with the expected name.
    #[error("response has no output named '{name}'")]
    MissingOutput {
        /// The expected tensor name.
        name: String,
    },

    /// The output tensor has a different shape than expected.
    #[error("output '{name}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        /// The tensor name.
        name: String,
        /// The expected shape.
        expected: Vec<i64>,
        /// The shape found in the response.
        actual: Vec<i64>,
    },

    /// The output tensor has a different datatype than expected.
    #[error("output '{name}' has datatype {actual}, expected {expected}")]
    DatatypeMismatch {
        /// The tensor name.
        name: String,
        /// The expected datatype string.
        expected: String,
        /// The datatype string found in the response.
        actual: String,
    },

    /// The raw byte buffer does not match the size implied by the expected
    /// shape and datatype.
    #[error("output '{name}' carries {actual} bytes, expected {expected}")]
    ByteSizeMismatch {
        /// The tensor name.
        name: String,
        /// The byte count implied by the expected shape and datatype.
        expected: usize,
        /// The byte count found in the response.
        actual: usize,
    },
}

/// The expected shape and datatype of one output tensor.
///
/// # Example
///
/// ```rust
/// use infer_client::infer::DataType;
/// use infer_client::validate::OutputExpectation;
///
/// let expectation = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int32);
/// assert_eq!(expectation.byte_size(), Some(64));
/// ```
#[derive(Debug, Clone)]
pub struct OutputExpectation {
    name: String,
    shape: Vec<i64>,
    datatype: DataType,
}

impl OutputExpectation {
    /// Creates an expectation for the named output tensor.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Vec<i64>, datatype: DataType) -> Self {
        Self {
            name: name.into(),
            shape,
            datatype,
        }
    }

    /// Returns the expected tensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the expected shape.
    #[must_use]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Returns the expected datatype.
    #[must_use]
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the number of elements implied by the expected shape.
    ///
    /// Negative (variable-size) dimensions contribute a count of zero.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape
            .iter()
            .map(|&dim| usize::try_from(dim).unwrap_or(0))
            .product()
    }

    /// Returns the raw byte size implied by the expected shape and datatype,
    /// or `None` for variable-length datatypes.
    #[must_use]
    pub fn byte_size(&self) -> Option<usize> {
        self.datatype
            .element_size()
            .map(|size| size * self.element_count())
    }

    /// Checks the named output of `result` against this expectation.
    ///
    /// The checks run in order: the output must exist, its shape and
    /// datatype must match, and for fixed-width datatypes the raw buffer
    /// must hold exactly the implied number of bytes.
    ///
    /// # Errors
    ///
    /// Returns the recorded request failure when `result` carries no
    /// response, and [`ValidationError`] (wrapped in
    /// [`Error::Validation`](crate::error::Error::Validation)) for the
    /// first structural discrepancy found.
    pub fn validate(&self, result: &InferResult) -> Result<()> {
        result.status()?;

        let shape = match result.shape(&self.name) {
            Ok(shape) => shape,
            Err(_) => {
                return Err(ValidationError::MissingOutput {
                    name: self.name.clone(),
                }
                .into());
            }
        };
        if shape != self.shape.as_slice() {
            return Err(ValidationError::ShapeMismatch {
                name: self.name.clone(),
                expected: self.shape.clone(),
                actual: shape.to_vec(),
            }
            .into());
        }

        let datatype = result.datatype(&self.name)?;
        if datatype != self.datatype.as_str() {
            return Err(ValidationError::DatatypeMismatch {
                name: self.name.clone(),
                expected: self.datatype.as_str().to_owned(),
                actual: datatype.to_owned(),
            }
            .into());
        }

        if let Some(expected_bytes) = self.byte_size() {
            let actual_bytes = result.raw_bytes(&self.name)?.len();
            if actual_bytes != expected_bytes {
                return Err(ValidationError::ByteSizeMismatch {
                    name: self.name.clone(),
                    expected: expected_bytes,
                    actual: actual_bytes,
                }
                .into());
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, RequestError};
    use crate::generated::inference;

    fn result_with_output(
        name: &str,
        datatype: &str,
        shape: Vec<i64>,
        raw: Vec<u8>,
    ) -> InferResult {
        InferResult::from_response(inference::ModelInferResponse {
            model_name: "simple".into(),
            model_version: "1".into(),
            id: String::new(),
            parameters: Default::default(),
            outputs: vec![inference::model_infer_response::InferOutputTensor {
                name: name.into(),
                datatype: datatype.into(),
                shape,
                parameters: Default::default(),
                contents: None,
            }],
            raw_output_contents: vec![raw],
        })
    }

    #[test]
    fn expectation_byte_size() {
        let e = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int32);
        assert_eq!(e.element_count(), 16);
        assert_eq!(e.byte_size(), Some(64));

        let bytes = OutputExpectation::new("text", vec![1, 2], DataType::Bytes);
        assert_eq!(bytes.byte_size(), None);

        // Variable-size dimensions collapse the implied count to zero.
        let dynamic = OutputExpectation::new("dyn", vec![-1, 4], DataType::Fp32);
        assert_eq!(dynamic.element_count(), 0);
        assert_eq!(dynamic.byte_size(), Some(0));
    }

    #[test]
    fn validate_accepts_conforming_output() {
        let result = result_with_output("OUTPUT0", "INT32", vec![1, 16], vec![0; 64]);
        let expectation = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int32);

        expectation.validate(&result).unwrap();
    }

    #[test]
    fn validate_rejects_wrong_shape() {
        let result = result_with_output("OUTPUT0", "INT32", vec![1, 15], vec![0; 60]);
        let expectation = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int32);

        match expectation.validate(&result) {
            Err(Error::Validation(ValidationError::ShapeMismatch {
                name,
                expected,
                actual,
            })) => {
                assert_eq!(name, "OUTPUT0");
                assert_eq!(expected, vec![1, 16]);
                assert_eq!(actual, vec![1, 15]);
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_wrong_datatype() {
        let result = result_with_output("OUTPUT0", "INT32", vec![1, 16], vec![0; 64]);
        let expectation = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int16);

        assert!(matches!(
            expectation.validate(&result),
            Err(Error::Validation(ValidationError::DatatypeMismatch { expected, actual, .. }))
                if expected == "INT16" && actual == "INT32"
        ));
    }

    #[test]
    fn validate_rejects_wrong_byte_size() {
        // 60 bytes cannot hold 16 INT32 elements.
        let result = result_with_output("OUTPUT0", "INT32", vec![1, 16], vec![0; 60]);
        let expectation = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int32);

        assert!(matches!(
            expectation.validate(&result),
            Err(Error::Validation(ValidationError::ByteSizeMismatch {
                expected: 64,
                actual: 60,
                ..
            }))
        ));
    }

    #[test]
    fn validate_rejects_missing_output() {
        let result = result_with_output("OUTPUT0", "INT32", vec![1, 16], vec![0; 64]);
        let expectation = OutputExpectation::new("OUTPUT9", vec![1, 16], DataType::Int32);

        assert!(matches!(
            expectation.validate(&result),
            Err(Error::Validation(ValidationError::MissingOutput { name })) if name == "OUTPUT9"
        ));
    }

    #[test]
    fn validate_surfaces_request_failure_first() {
        let result = InferResult::from_error(RequestError::Failed {
            code: tonic::Code::Unavailable,
            message: "connection reset".into(),
        });
        let expectation = OutputExpectation::new("OUTPUT0", vec![1, 16], DataType::Int32);

        // A failed request is not a validation problem.
        assert!(matches!(
            expectation.validate(&result),
            Err(Error::Grpc { code, .. }) if code == tonic::Code::Unavailable
        ));
    }
}
