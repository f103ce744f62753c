#![allow(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_debug_implementations,
    unreachable_pub,
    unused_qualifications
)]

pub mod agro {
    pub mod v1 {
        tonic::include_proto!("agro.v1");
    }
}
