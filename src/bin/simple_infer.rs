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

//! Synchronous inference demo against the `simple` model.
//!
//! The simple model takes 2 input tensors of 16 integers each and returns
//! 2 output tensors of 16 integers each. One output tensor is the
//! element-wise sum of the inputs and one output is the element-wise
//! difference. The demo runs one inference, validates the shape, datatype,
//! and byte size of both outputs, checks the arithmetic, and prints the
//! client and model statistics.
//!
//! ```bash
//! cargo run --bin simple_infer -- -u http://localhost:8001
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use infer_client::client::{ClientOptions, Compression, InferenceClient, TlsOptions};
use infer_client::infer::{DataType, InferInput, InferRequestBuilder};
use infer_client::validate::OutputExpectation;

#[derive(Debug, Parser)]
#[command(about = "Run a synchronous inference against the 'simple' model")]
struct Args {
    /// URL for the inference service.
    #[arg(short, long, default_value = "http://localhost:8001")]
    url: String,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,

    /// Model name.
    #[arg(short, long, default_value = "simple")]
    model_name: String,

    /// Model version. Empty selects the server's default version.
    #[arg(short = 'x', long, default_value = "")]
    model_version: String,

    /// Request identifier echoed back by the server.
    #[arg(short = 'i', long, default_value = "1")]
    request_id: String,

    /// Client timeout in microseconds. 0 means no timeout.
    #[arg(short = 't', long, default_value_t = 0)]
    client_timeout: u64,

    /// Custom header, must be formatted as 'Header:Value'. May be given
    /// multiple times.
    #[arg(short = 'H', long = "header", value_name = "HEADER:VALUE")]
    headers: Vec<String>,

    /// Use an SSL/TLS-encrypted channel.
    #[arg(long)]
    ssl: bool,

    /// PEM file holding the root certificates.
    #[arg(long)]
    root_certificates: Option<PathBuf>,

    /// PEM file holding the client's private key.
    #[arg(long)]
    private_key: Option<PathBuf>,

    /// PEM file holding the client's certificate chain.
    #[arg(long)]
    certificate_chain: Option<PathBuf>,

    /// gRPC compression algorithm. 'gzip', 'zstd' and 'none' are supported.
    #[arg(short = 'C', long, default_value = "none")]
    compression: Compression,

    /// Use the process-wide channel cache; specify true or false. When
    /// given, the whole flow runs twice to exercise the cache.
    #[arg(short = 'c', long)]
    use_cached_channel: Option<bool>,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn client_options(args: &Args) -> Result<ClientOptions> {
    let mut options = ClientOptions::default()
        .compression(args.compression)
        .use_cached_channel(args.use_cached_channel.unwrap_or(true));

    for header in &args.headers {
        let (name, value) = header.split_once(':').with_context(|| {
            format!("header specified incorrectly, must be formatted as 'Header:Value': {header}")
        })?;
        options = options.header(name, value);
    }

    if args.ssl {
        let mut tls = TlsOptions::default();
        if let Some(path) = &args.root_certificates {
            tls = tls.root_certificates(path);
        }
        if let Some(path) = &args.private_key {
            tls = tls.private_key(path);
        }
        if let Some(path) = &args.certificate_chain {
            tls = tls.certificate_chain(path);
        }
        options = options.tls(tls);
    }

    Ok(options)
}

async fn run_infer(args: &Args) -> Result<()> {
    let connect_err = if args.ssl {
        "unable to create secure grpc client"
    } else {
        "unable to create grpc client"
    };
    let client = InferenceClient::connect_with_options(&args.url, client_options(args)?)
        .await
        .context(connect_err)?;

    // Initialize the first input to unique integers and the second to all
    // ones.
    let input0_data: Vec<i32> = (0..16).collect();
    let input1_data = vec![1_i32; 16];

    let input0 = InferInput::new("INPUT0", vec![1, 16], DataType::Int32).with_data(&input0_data);
    let input1 = InferInput::new("INPUT1", vec![1, 16], DataType::Int32).with_data(&input1_data);

    let mut builder = InferRequestBuilder::new(args.model_name.as_str())
        .model_version(args.model_version.as_str())
        .request_id(args.request_id.as_str())
        .input(input0)
        .input(input1)
        .output("OUTPUT0")
        .output("OUTPUT1");
    if args.client_timeout > 0 {
        builder = builder.timeout(Duration::from_micros(args.client_timeout));
    }
    let request = builder.build();

    let result = client.infer(request).await.context("unable to run model")?;

    // Validate the results...
    for name in ["OUTPUT0", "OUTPUT1"] {
        OutputExpectation::new(name, vec![1, 16], DataType::Int32)
            .validate(&result)
            .with_context(|| format!("unexpected '{name}' tensor"))?;
    }

    let output0_data = result
        .output_as::<i32>("OUTPUT0")
        .context("unable to get result data for 'OUTPUT0'")?;
    let output1_data = result
        .output_as::<i32>("OUTPUT1")
        .context("unable to get result data for 'OUTPUT1'")?;

    for i in 0..16 {
        println!(
            "{} + {} = {}",
            input0_data[i], input1_data[i], output0_data[i]
        );
        println!(
            "{} - {} = {}",
            input0_data[i], input1_data[i], output1_data[i]
        );

        if input0_data[i] + input1_data[i] != output0_data[i] {
            bail!("incorrect sum at element {i}");
        }
        if input0_data[i] - input1_data[i] != output1_data[i] {
            bail!("incorrect difference at element {i}");
        }
    }

    let client_stat = client.client_statistics();
    println!("======Client Statistics======");
    println!(
        "completed_request_count {}",
        client_stat.completed_request_count
    );
    println!(
        "cumulative_total_request_time_ns {}",
        client_stat.cumulative_total_request_time_ns
    );

    let model_stat = client
        .model_statistics(&args.model_name, &args.model_version)
        .await
        .context("unable to get model statistics")?;
    println!("======Model Statistics======");
    println!("{model_stat:#?}");

    println!("PASS : Infer");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // When the cached-channel flag is given, run twice with the same URL to
    // exercise the channel cache.
    let runs = if args.use_cached_channel.is_some() { 2 } else { 1 };
    for _ in 0..runs {
        run_infer(&args).await?;
    }
    Ok(())
}
