//! 命名服务接入选项

use serde::{Deserialize, Serialize};

use crate::registry::ServiceInstance;

/// 单次查询的最大分页大小
pub const MAX_PAGE_SIZE: u32 = i32::MAX as u32;

/// 默认注册权重
pub const DEFAULT_WEIGHT: f64 = 10.0;

/// 命名服务接入选项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamingOptions {
    /// 查询与订阅时限定的集群，为空表示不限
    pub clusters: Vec<String>,

    /// 注册时使用的集群名
    pub cluster_name: String,

    /// 注册权重
    pub weight: f64,

    /// 命名空间
    pub namespace: String,

    /// 分组名，为空时使用实例的 scheme
    pub group_name: String,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            clusters: Vec::new(),
            cluster_name: String::new(),
            weight: DEFAULT_WEIGHT,
            namespace: String::new(),
            group_name: String::new(),
        }
    }
}

impl NamingOptions {
    pub fn with_clusters(mut self, clusters: Vec<String>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_cluster_name(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = cluster_name.into();
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = group_name.into();
        self
    }

    /// 解析实例所属分组：显式配置优先，否则使用实例的 scheme
    pub fn group_name_for(&self, instance: &ServiceInstance) -> String {
        if self.group_name.is_empty() {
            instance.scheme().to_string()
        } else {
            self.group_name.clone()
        }
    }
}
