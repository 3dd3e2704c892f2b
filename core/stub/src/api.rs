// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod proto {
    pub mod videoin {
        pub mod v1 {
            tonic::include_proto!("videoin.v1");
        }
    }
}

pub use proto::videoin::v1;
