#![no_main]

use std::io::Read;

use libfuzzer_sys::fuzz_target;
use mimepart::{Constraints, Multipart};

fuzz_target!(|data: &[u8]| {
    // The first byte picks the buffer size so tiny buffers get exercised too.
    let (buffer_size, data) = match data.split_first() {
        Some((&size, rest)) => (size as usize, rest),
        None => (0, data),
    };

    let constraints = Constraints::new().buffer_size(buffer_size);
    let mut multipart = Multipart::with_constraints(data, "X-BOUNDARY", constraints);

    let mut breaks = 0;
    let mut sink = [0; 64];
    while breaks < 3 {
        match multipart.next_part() {
            Err(_) | Ok(None) => breaks += 1,
            Ok(Some(mut part)) => while let Ok(1..=64) = part.read(&mut sink) {},
        }
    }
});
