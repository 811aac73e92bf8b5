use std::io::{self, Read};

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use swap_router_encoding::encoding::{
    evm::encoder_builders::SwapRouterEncoderBuilder,
    models::{AddLiquidityOptions, ApprovalType, MethodParameters, Position, SwapOptions, Trade},
    router_encoder::RouterEncoder,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tycho_common::{models::Chain, Bytes};

#[derive(Parser)]
/// Encode swap router multicalls for already computed trades
///
/// Reads a JSON object from stdin with the following structure:
/// ```json
/// {
///     "trades": [{
///         "trade_type": "exact_input",
///         "input_token": "0x...",
///         "output_token": "0x...",
///         "fee_on_transfer": false,
///         "routes": [{
///             "hops": [{
///                 "protocol_system": "uniswap_v3",
///                 "pool": "0x...",
///                 "fee": 500,
///                 "token_in": "0x...",
///                 "token_out": "0x..."
///             }],
///             "input_amount": "123...",
///             "output_amount": "123..."
///         }]
///     }],
///     "options": {
///         "slippage_tolerance": {"numerator": "50", "denominator": "10000"},
///         "recipient": "0x...",
///         "validation": {"deadline": "1700000000"}
///     }
/// }
/// ```
/// `swap-and-add` additionally expects `position`, `add_liquidity_options`,
/// `token_in_approval_type` and `token_out_approval_type`.
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[arg(short, long, env = "SWAP_ENCODE_CHAIN")]
    chain: Chain,
    #[arg(short, long, env = "SWAP_ENCODE_ROUTER_ADDRESS")]
    router_address: Option<Bytes>,
    #[arg(long, env = "SWAP_ENCODE_ROUTER_ADDRESSES_FILE")]
    router_addresses_file_path: Option<String>,
    /// Sets the deadline to this many seconds from now, if the options carry no validation.
    #[arg(short, long)]
    deadline_in: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a swap
    Swap,
    /// Encode a swap followed by adding liquidity to a position
    SwapAndAdd,
}

#[derive(Deserialize)]
struct SwapRequest {
    trades: Vec<Trade>,
    options: Value,
}

#[derive(Deserialize)]
struct SwapAndAddRequest {
    trades: Vec<Trade>,
    options: Value,
    position: Position,
    add_liquidity_options: AddLiquidityOptions,
    token_in_approval_type: ApprovalType,
    token_out_approval_type: ApprovalType,
}

fn parse_options(
    mut options: Value,
    deadline_in: Option<i64>,
) -> Result<SwapOptions, Box<dyn std::error::Error>> {
    if let Some(seconds) = deadline_in {
        let options_map = options
            .as_object_mut()
            .ok_or("Expected the options to be a JSON object")?;
        if options_map.contains_key("validation") {
            return Err("Use either --deadline-in or a validation in the options, not both".into());
        }
        let deadline = Utc::now().timestamp() + seconds;
        if deadline < 0 {
            return Err(format!("Deadline {deadline} lies before the unix epoch").into());
        }
        debug!(deadline, "using relative deadline");
        options_map.insert(
            "validation".to_string(),
            serde_json::json!({ "deadline": deadline.to_string() }),
        );
    }
    Ok(serde_json::from_value(options)?)
}

fn to_json(params: &MethodParameters) -> Value {
    serde_json::json!({
        "to": params.to.to_string(),
        "calldata": format!("0x{}", hex::encode(&params.calldata)),
        "value": params.value.to_string(),
        "calls": params
            .calls
            .iter()
            .map(|call| call.selector.clone())
            .collect::<Vec<_>>(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    // Read from stdin until EOF
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read from stdin: {e}"))?;

    if buffer.trim().is_empty() {
        return Err("No input provided. Expected JSON input on stdin.".into());
    }

    let mut builder = SwapRouterEncoderBuilder::new().chain(cli.chain);
    if let Some(path) = cli.router_addresses_file_path {
        builder = builder.router_addresses_file_path(path);
    }
    if let Some(router_address) = cli.router_address {
        builder = builder.router_address(router_address);
    }
    let encoder: Box<dyn RouterEncoder> = builder.build()?;

    let params = match cli.command {
        Commands::Swap => {
            let request: SwapRequest = serde_json::from_str(&buffer)?;
            let options = parse_options(request.options, cli.deadline_in)?;
            encoder.swap_call_parameters(&request.trades, &options)?
        }
        Commands::SwapAndAdd => {
            let request: SwapAndAddRequest = serde_json::from_str(&buffer)?;
            let options = parse_options(request.options, cli.deadline_in)?;
            encoder.swap_and_add_call_parameters(
                &request.trades,
                &options,
                &request.position,
                &request.add_liquidity_options,
                request.token_in_approval_type,
                request.token_out_approval_type,
            )?
        }
    };

    // Output the encoded result as JSON to stdout
    println!(
        "{}",
        serde_json::to_string(&to_json(&params))
            .map_err(|e| format!("Failed to serialize output: {e}"))?
    );

    Ok(())
}
