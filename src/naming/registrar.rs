//! 基于命名服务客户端的服务注册

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::client::{DeregisterInstanceParam, NamingClient, RegisterInstanceParam};
use super::options::NamingOptions;
use super::INSTANCE_ID_KEY;
use crate::error::{ErrorCode, RegistryError, Result};
use crate::registry::instance::is_blank;
use crate::registry::{Registrar, ServiceInstance};

/// 服务注册器
///
/// 注册的实例总是临时（ephemeral）、健康且上线的。
pub struct NamingRegistrar {
    client: Arc<dyn NamingClient>,
    options: NamingOptions,
}

impl NamingRegistrar {
    pub fn new(client: Arc<dyn NamingClient>, options: NamingOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &NamingOptions {
        &self.options
    }
}

#[async_trait]
impl Registrar for NamingRegistrar {
    async fn register(&self, instance: &ServiceInstance) -> Result<()> {
        if is_blank(instance.name()) {
            return Err(RegistryError::blank_service_name("register"));
        }

        let mut metadata = instance.metadata().clone();
        if !is_blank(instance.id()) {
            metadata.insert(INSTANCE_ID_KEY.to_string(), instance.id().to_string());
        }
        let param = RegisterInstanceParam {
            ip: instance.ip().to_string(),
            port: instance.port(),
            weight: self.options.weight,
            enabled: true,
            healthy: true,
            metadata,
            cluster_name: self.options.cluster_name.clone(),
            service_name: instance.name().to_string(),
            group_name: self.options.group_name_for(instance),
            ephemeral: true,
        };
        debug!(
            service = %param.service_name,
            group = %param.group_name,
            address = %instance.address(),
            "Registering instance"
        );

        let ok = self
            .client
            .register_instance(param)
            .await
            .map_err(|e| {
                RegistryError::backend(ErrorCode::BackendError, "register", instance.address(), e)
            })?;
        if !ok {
            return Err(RegistryError::register_failed(instance.address()));
        }

        info!(
            service = %instance.name(),
            instance_id = %instance.id(),
            address = %instance.address(),
            "Service registered"
        );
        Ok(())
    }

    async fn deregister(&self, instance: &ServiceInstance) -> Result<()> {
        if is_blank(instance.name()) {
            return Err(RegistryError::blank_service_name("deregister"));
        }

        let param = DeregisterInstanceParam {
            ip: instance.ip().to_string(),
            port: instance.port(),
            cluster_name: self.options.cluster_name.clone(),
            service_name: instance.name().to_string(),
            group_name: self.options.group_name_for(instance),
            ephemeral: true,
        };

        let ok = self
            .client
            .deregister_instance(param)
            .await
            .map_err(|e| {
                RegistryError::backend(
                    ErrorCode::BackendError,
                    "deregister",
                    instance.address(),
                    e,
                )
            })?;
        if !ok {
            return Err(RegistryError::deregister_failed(instance.address()));
        }

        info!(
            service = %instance.name(),
            instance_id = %instance.id(),
            address = %instance.address(),
            "Service deregistered"
        );
        Ok(())
    }
}
