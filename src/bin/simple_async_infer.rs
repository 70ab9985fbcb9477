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

//! Asynchronous inference demo against the `simple` model.
//!
//! Submits a batch of inference requests whose completion handlers count
//! down through a [`CompletionBarrier`], then a single request whose
//! handler defers the completed result to the main thread through a
//! [`HandoffSlot`]. The main thread never enters the runtime; it blocks on
//! the completion primitives the way a plain thread would.
//!
//! ```bash
//! cargo run --bin simple_async_infer -- -u http://localhost:8001 -r 4
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use infer_client::client::{ClientOptions, InferenceClient};
use infer_client::completion::{CompletionBarrier, HandoffSlot};
use infer_client::infer::{DataType, InferInput, InferRequest, InferRequestBuilder, InferResult};
use infer_client::validate::OutputExpectation;

#[derive(Debug, Parser)]
#[command(about = "Run asynchronous inferences against the 'simple' model")]
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

    /// Number of concurrent requests in the first phase.
    #[arg(short = 'r', long, default_value_t = 4)]
    repeat_count: usize,
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
    let mut options = ClientOptions::default();
    for header in &args.headers {
        let (name, value) = header.split_once(':').with_context(|| {
            format!("header specified incorrectly, must be formatted as 'Header:Value': {header}")
        })?;
        options = options.header(name, value);
    }
    Ok(options)
}

fn build_request(args: &Args, input0_data: &[i32], input1_data: &[i32]) -> InferRequest {
    let mut builder = InferRequestBuilder::new(args.model_name.as_str())
        .model_version(args.model_version.as_str())
        .request_id(args.request_id.as_str())
        .input(InferInput::new("INPUT0", vec![1, 16], DataType::Int32).with_data(input0_data))
        .input(InferInput::new("INPUT1", vec![1, 16], DataType::Int32).with_data(input1_data))
        .output("OUTPUT0")
        .output("OUTPUT1");
    if args.client_timeout > 0 {
        builder = builder.timeout(Duration::from_micros(args.client_timeout));
    }
    builder.build()
}

fn validate_result(input0_data: &[i32], input1_data: &[i32], result: &InferResult) -> Result<()> {
    for name in ["OUTPUT0", "OUTPUT1"] {
        OutputExpectation::new(name, vec![1, 16], DataType::Int32)
            .validate(result)
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
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // The completion primitives block the calling thread, so the runtime
    // lives on its own worker threads and the main thread stays free to
    // wait on them.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("unable to start runtime")?;

    let client = runtime
        .block_on(InferenceClient::connect_with_options(
            &args.url,
            client_options(&args)?,
        ))
        .context("unable to create grpc client")?;

    // Initialize the first input to unique integers and the second to all
    // ones.
    let input0_data: Vec<i32> = (0..16).collect();
    let input1_data = vec![1_i32; 16];
    let request = build_request(&args, &input0_data, &input1_data);

    // Send a batch of requests and count their completions through a shared
    // barrier. Handlers record the result and arrive; the main thread blocks
    // until every handler has run.
    let barrier = Arc::new(CompletionBarrier::new());
    let results: Arc<Mutex<Vec<(usize, InferResult)>>> = Arc::new(Mutex::new(Vec::new()));

    for i in 0..args.repeat_count {
        let barrier = Arc::clone(&barrier);
        let results = Arc::clone(&results);
        client.async_infer(request.clone(), move |result| {
            println!("Callback no.{i} is called");
            results
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((i, result));
            barrier.arrive();
        });
    }

    barrier
        .wait_exact(args.repeat_count)
        .context("completion count mismatch")?;
    println!("All done");

    let collected = std::mem::take(&mut *results.lock().unwrap_or_else(PoisonError::into_inner));
    for (i, result) in &collected {
        result
            .status()
            .with_context(|| format!("inference no.{i} failed"))?;
        validate_result(&input0_data, &input1_data, result)?;
    }

    // Send another request whose handler defers the completed result to the
    // main thread through a single-value slot.
    let slot: Arc<HandoffSlot<InferResult>> = Arc::new(HandoffSlot::new());
    let publisher = Arc::clone(&slot);
    client.async_infer(request, move |result| {
        if publisher.publish(result).is_err() {
            eprintln!("error: deferred result slot is already occupied");
        }
    });

    let deferred = slot.take();
    println!("Getting results from deferred response");
    deferred.status().context("inference failed")?;
    validate_result(&input0_data, &input1_data, &deferred)?;

    let stat = client.client_statistics();
    println!("completed_request_count {}", stat.completed_request_count);
    println!(
        "cumulative_total_request_time_ns {}",
        stat.cumulative_total_request_time_ns
    );

    println!("PASS : Async Infer");

    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}
