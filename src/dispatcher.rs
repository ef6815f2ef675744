use std::sync::Arc;

use crate::{
    endpoint::Endpoint,
    error::SelectError,
    invocation::{Invocation, ServiceTarget},
    load_balancer::LoadBalancer,
};

pub struct Dispatcher {
    balancer: Arc<dyn LoadBalancer>,
}

impl Dispatcher {
    pub fn new(balancer: Arc<dyn LoadBalancer>) -> Self {
        Self { balancer }
    }

    pub fn select(
        &self,
        candidates: &[Arc<Endpoint>],
        target: &ServiceTarget,
        invocation: &Invocation,
    ) -> Result<Arc<Endpoint>, SelectError> {
        match candidates {
            [] => Err(SelectError::EmptyCandidates),
            // a single candidate skips all policy work, weight resolution included
            [endpoint] => Ok(Arc::clone(endpoint)),
            _ => self.balancer.select(candidates, target, invocation),
        }
    }
}
