use criterion::{criterion_group, criterion_main};

mod network {
    pub mod application {
        pub mod http {
            pub mod parser;
        }
    }
}

criterion_group!(
    benches,
    network::application::http::parser::bench_fixed_length,
    network::application::http::parser::bench_chunked,
    network::application::http::parser::bench_fragmented_headers
);
criterion_main!(benches);
