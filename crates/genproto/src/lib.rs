pub mod hipstershop {
    include!("gen/hipstershop.rs");
}

pub mod health {
    include!("gen/grpc.health.v1.rs");
}
