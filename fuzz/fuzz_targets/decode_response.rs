#![no_main]
use libfuzzer_sys::fuzz_target;
use percolate_wire::PercolateShardResponse;

fuzz_target!(|data: &[u8]| {
    let mut stream = data;
    let _ = PercolateShardResponse::decode(&mut stream);
});
