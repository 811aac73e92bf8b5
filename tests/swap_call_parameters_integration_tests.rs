mod common;

use alloy::{hex::encode, sol_types::SolCall};
use num_bigint::BigUint;
use rstest::rstest;
use swap_router_encoding::encoding::{
    errors::EncodingError,
    evm::abi::{IMulticallBlockhash, IMulticallDeadline, IV3SwapRouter},
    models::{FeeOptions, Percent, SwapOptions, TradeType, Validation},
};
use tycho_common::Bytes;

use crate::common::{
    alice, bob, dai, eth, get_router_encoder, route, router_address, swap_options, trade, usdc,
    usdc_dai_v3_pool, v2_hop, v3_hop, weth, weth_dai_v2_pool, weth_usdc_v3_pool,
};

#[test]
fn test_single_v2_exact_input_multicall() {
    // Swaps 1000 WETH units for at least floor(990 * 0.995) DAI units on a USV2 pool. The output
    // goes straight to the caller, so the only call in the multicall is the swap.
    let trades = vec![trade(
        TradeType::ExactInput,
        weth(),
        dai(),
        vec![route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990)],
    )];

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &swap_options())
        .unwrap();

    assert_eq!(params.to, router_address());
    assert_eq!(params.value, BigUint::ZERO);

    let expected_swap = [
        "472b43f3",                                                         // Function selector
        "00000000000000000000000000000000000000000000000000000000000003e8", // amount in
        "00000000000000000000000000000000000000000000000000000000000003d9", // min amount out
        "0000000000000000000000000000000000000000000000000000000000000080", // path offset
        "0000000000000000000000000000000000000000000000000000000000000001", // msg.sender
        "0000000000000000000000000000000000000000000000000000000000000002", // path length
        "000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", // weth
        "0000000000000000000000006b175474e89094c44da98b954eedeac495271d0f", // dai
    ]
    .join("");
    let expected_input = [
        "5ae401dc",                                                         // Function selector
        "000000000000000000000000000000000000000000000000000000006553f100", // deadline
        "0000000000000000000000000000000000000000000000000000000000000040", // calls offset
        "0000000000000000000000000000000000000000000000000000000000000001", // number of calls
        "0000000000000000000000000000000000000000000000000000000000000020", // first call offset
        "00000000000000000000000000000000000000000000000000000000000000e4", // first call length
        &expected_swap,
        "00000000000000000000000000000000000000000000000000000000", // padding
    ]
    .join("");

    let hex_calldata = encode(&params.calldata);
    assert_eq!(hex_calldata, expected_input);
    assert_eq!(encode(&params.calls[0].data), expected_swap);
    assert_eq!(params.calls[0].selector, "swapExactTokensForTokens(uint256,uint256,address[],address)");
}

#[test]
fn test_multi_hop_v3_exact_input_path() {
    let trades = vec![trade(
        TradeType::ExactInput,
        weth(),
        dai(),
        vec![route(
            vec![
                v3_hop(weth_usdc_v3_pool(), 500, weth(), usdc()),
                v3_hop(usdc_dai_v3_pool(), 100, usdc(), dai()),
            ],
            1000,
            2000,
        )],
    )];
    let mut options = swap_options();
    options.recipient = Some(alice());

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();

    assert_eq!(params.calls.len(), 1);
    let call = IV3SwapRouter::exactInputCall::abi_decode(&params.calls[0].data).unwrap();
    let expected_path = [
        "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", // weth
        "0001f4",                                   // 0.05% fee
        "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // usdc
        "000064",                                   // 0.01% fee
        "6b175474e89094c44da98b954eedeac495271d0f", // dai
    ]
    .join("");
    assert_eq!(encode(&call.params.path), expected_path);
    assert_eq!(call.params.recipient.as_slice(), alice().as_ref());
    assert_eq!(call.params.amountIn.to_string(), "1000");
    assert_eq!(call.params.amountOutMinimum.to_string(), "1990");
}

#[test]
fn test_multi_hop_v3_exact_output_path_is_reversed() {
    let trades = vec![trade(
        TradeType::ExactOutput,
        weth(),
        dai(),
        vec![route(
            vec![
                v3_hop(weth_usdc_v3_pool(), 500, weth(), usdc()),
                v3_hop(usdc_dai_v3_pool(), 100, usdc(), dai()),
            ],
            1000,
            2000,
        )],
    )];

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &swap_options())
        .unwrap();

    let call = IV3SwapRouter::exactOutputCall::abi_decode(&params.calls[0].data).unwrap();
    let expected_path = [
        "6b175474e89094c44da98b954eedeac495271d0f", // dai
        "000064",                                   // 0.01% fee
        "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // usdc
        "0001f4",                                   // 0.05% fee
        "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", // weth
    ]
    .join("");
    assert_eq!(encode(&call.params.path), expected_path);
    assert_eq!(call.params.amountOut.to_string(), "2000");
    // ceil(1000 * 1.005)
    assert_eq!(call.params.amountInMaximum.to_string(), "1005");
    assert_eq!(params.value, BigUint::ZERO);
}

#[test]
fn test_native_input_exact_input_sends_value() {
    let trades = vec![trade(
        TradeType::ExactInput,
        eth(),
        dai(),
        vec![route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990)],
    )];

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &swap_options())
        .unwrap();

    assert_eq!(params.value, BigUint::from(1000u32));
    let selectors: Vec<&str> = params
        .calls
        .iter()
        .map(|call| call.selector.as_str())
        .collect();
    assert_eq!(
        selectors,
        vec![
            "wrapETH(uint256)",
            "swapExactTokensForTokens(uint256,uint256,address[],address)",
            "unwrapWETH9(uint256)",
        ]
    );
}

#[test]
fn test_native_output_is_unwrapped_to_recipient() {
    let trades = vec![trade(
        TradeType::ExactInput,
        dai(),
        eth(),
        vec![route(vec![v2_hop(weth_dai_v2_pool(), dai(), weth())], 2000, 1000)],
    )];
    let mut options = swap_options();
    options.recipient = Some(bob());

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();

    assert_eq!(params.value, BigUint::ZERO);
    // The swap pays the router, which unwraps and forwards to bob.
    assert_eq!(&encode(&params.calls[0].data)[200..264], format!("{:064x}", 2));
    let expected_unwrap = [
        "49404b7c",                                                         // Function selector
        "00000000000000000000000000000000000000000000000000000000000003e3", // min amount (995)
        "0000000000000000000000009964bff29baa37b47604f3f3f51f3b3c5149d6de", // bob
    ]
    .join("");
    assert_eq!(encode(&params.calls[1].data), expected_unwrap);
}

#[rstest]
#[case::small(985u32)]
#[case::exact_bips(10_000u32)]
#[case::large(1_234_567_891u32)]
fn test_fee_split_preserves_output(#[case] amount: u32) {
    let fee = FeeOptions::new(Percent::from_bips(30), alice());
    let amount = BigUint::from(amount);

    let (fee_amount, remainder) = fee.split(&amount).unwrap();

    assert_eq!(&fee_amount + &remainder, amount);
    assert_eq!(fee_amount, &amount * 30u32 / 10_000u32);
}

#[test]
fn test_output_fee_uses_sweep_with_fee() {
    let trades = vec![trade(
        TradeType::ExactInput,
        weth(),
        dai(),
        vec![route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990)],
    )];
    let mut options = swap_options();
    options.recipient = Some(alice());
    options.fee = Some(FeeOptions::new(Percent::from_bips(25), bob()));

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();

    let expected_sweep = [
        "e0e189a0",                                                         // Function selector
        "0000000000000000000000006b175474e89094c44da98b954eedeac495271d0f", // dai
        "00000000000000000000000000000000000000000000000000000000000003d9", // min amount (985)
        "000000000000000000000000cd09f75e2bf2a4d11f3ab23f1389fcc1621c0cc2", // alice
        "0000000000000000000000000000000000000000000000000000000000000019", // fee bips
        "0000000000000000000000009964bff29baa37b47604f3f3f51f3b3c5149d6de", // fee recipient
    ]
    .join("");
    assert_eq!(params.calls.len(), 2);
    assert_eq!(encode(&params.calls[1].data), expected_sweep);
}

#[test]
fn test_previous_blockhash_multicall() {
    let trades = vec![trade(
        TradeType::ExactInput,
        weth(),
        dai(),
        vec![route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990)],
    )];
    let mut options = swap_options();
    options.validation = Validation::PreviousBlockhash(Bytes::from([0xab; 32]));

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();

    let hex_calldata = encode(&params.calldata);
    assert_eq!(&hex_calldata[..8], "1f0464d1");
    assert_eq!(&hex_calldata[8..72], "ab".repeat(32));
    let call = IMulticallBlockhash::multicallCall::abi_decode(&params.calldata).unwrap();
    assert_eq!(call.data.len(), 1);
    assert_eq!(call.data[0].to_vec(), params.calls[0].data);
}

#[test]
fn test_multicall_bundles_every_call_in_order() {
    let trades = vec![trade(
        TradeType::ExactOutput,
        eth(),
        dai(),
        vec![
            route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990),
            route(vec![v3_hop(weth_usdc_v3_pool(), 500, weth(), dai())], 2000, 1980),
        ],
    )];

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &swap_options())
        .unwrap();

    let call = IMulticallDeadline::multicallCall::abi_decode(&params.calldata).unwrap();
    assert_eq!(call.deadline.to_string(), "1700000000");
    let bundled: Vec<Vec<u8>> = call
        .data
        .iter()
        .map(|data| data.to_vec())
        .collect();
    let expected: Vec<Vec<u8>> = params
        .calls
        .iter()
        .map(|call| call.data.clone())
        .collect();
    assert_eq!(bundled, expected);
    assert_eq!(params.calls.last().unwrap().selector, "refundETH()");
}

#[rstest]
#[case::both(r#"{"deadline": "1700000000", "previous_blockhash": "0xabababababababababababababababababababababababababababababababab"}"#)]
#[case::neither(r#"{}"#)]
#[case::short_blockhash(r#"{"previous_blockhash": "0xabab"}"#)]
fn test_invalid_validation_is_rejected(#[case] validation: &str) {
    let json = format!(
        r#"{{
            "slippage_tolerance": {{"numerator": "50", "denominator": "10000"}},
            "validation": {validation}
        }}"#
    );

    let res = serde_json::from_str::<SwapOptions>(&json);

    assert!(res.is_err());
}

#[test]
fn test_options_from_json() {
    let json = r#"{
        "slippage_tolerance": {"numerator": "50", "denominator": "10000"},
        "recipient": "0xcd09f75E2BF2A4d11F3AB23f1389FcC1621c0cc2",
        "validation": {"deadline": "1700000000"}
    }"#;

    let options: SwapOptions = serde_json::from_str(json).unwrap();

    assert_eq!(options.recipient, Some(alice()));
    assert_eq!(options.validation, Validation::Deadline(BigUint::from(1_700_000_000u32)));
    assert_eq!(options.slippage_tolerance, Percent::from_bips(50));
}

#[test]
fn test_excessive_slippage_is_rejected() {
    let trades = vec![trade(
        TradeType::ExactInput,
        weth(),
        dai(),
        vec![route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990)],
    )];
    let mut options = swap_options();
    options.slippage_tolerance = Percent::new(2u32, 1u32);

    let res = get_router_encoder().swap_call_parameters(&trades, &options);

    assert!(matches!(res, Err(EncodingError::InvalidInput(_))));
}

#[test]
fn test_native_input_exact_output_returns_unspent_input() {
    // The whole slippage-bounded maximum is wrapped up front. Whatever the swap does not spend is
    // unwrapped back to the caller before the refund.
    let trades = vec![trade(
        TradeType::ExactOutput,
        eth(),
        usdc(),
        vec![route(vec![v3_hop(weth_usdc_v3_pool(), 500, weth(), usdc())], 1000, 2000)],
    )];

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &swap_options())
        .unwrap();

    assert_eq!(params.value, BigUint::from(1005u32));
    let selectors: Vec<&str> = params
        .calls
        .iter()
        .map(|call| call.selector.as_str())
        .collect();
    assert_eq!(
        selectors,
        vec![
            "wrapETH(uint256)",
            "exactOutputSingle((address,address,uint24,address,uint256,uint256,uint160))",
            "unwrapWETH9(uint256)",
            "refundETH()",
        ]
    );
    assert_eq!(encode(&params.calls[0].data), format!("1c58db4f{:064x}", 1005));
    let expected_unwrap = [
        "49616997",                                                         // Function selector
        "0000000000000000000000000000000000000000000000000000000000000000", // min amount
    ]
    .join("");
    assert_eq!(encode(&params.calls[2].data), expected_unwrap);
}

#[test]
fn test_exact_output_fee_sweeps_exact_output_sum() {
    let trades = vec![trade(
        TradeType::ExactOutput,
        weth(),
        dai(),
        vec![
            route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 1000, 990),
            route(vec![v3_hop(weth_usdc_v3_pool(), 500, weth(), dai())], 500, 495),
        ],
    )];
    let mut options = swap_options();
    options.recipient = Some(alice());
    options.fee = Some(FeeOptions::new(Percent::from_bips(25), bob()));

    let params = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();

    assert_eq!(params.value, BigUint::ZERO);
    assert_eq!(params.calls.len(), 3);
    // Both swaps pay the router, which skims the fee from the exact output of 990 + 495.
    for call in &params.calls[..2] {
        assert_eq!(&encode(&call.data)[200..264], format!("{:064x}", 2));
    }
    let expected_sweep = [
        "e0e189a0",                                                         // Function selector
        "0000000000000000000000006b175474e89094c44da98b954eedeac495271d0f", // dai
        "00000000000000000000000000000000000000000000000000000000000005cd", // min amount (1485)
        "000000000000000000000000cd09f75e2bf2a4d11f3ab23f1389fcc1621c0cc2", // alice
        "0000000000000000000000000000000000000000000000000000000000000019", // fee bips
        "0000000000000000000000009964bff29baa37b47604f3f3f51f3b3c5149d6de", // fee recipient
    ]
    .join("");
    assert_eq!(encode(&params.calls[2].data), expected_sweep);
}

#[test]
fn test_encoding_is_deterministic() {
    let trades = vec![trade(
        TradeType::ExactInput,
        eth(),
        dai(),
        vec![
            route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 100, 300),
            route(vec![v2_hop(weth_dai_v2_pool(), weth(), dai())], 200, 600),
            route(vec![v3_hop(weth_usdc_v3_pool(), 500, weth(), dai())], 300, 900),
        ],
    )];
    let mut options = swap_options();
    options.recipient = Some(alice());
    options.fee = Some(FeeOptions::new(Percent::from_bips(30), bob()));

    let first = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();
    let second = get_router_encoder()
        .swap_call_parameters(&trades, &options)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(encode(&first.calldata), encode(&second.calldata));
}
