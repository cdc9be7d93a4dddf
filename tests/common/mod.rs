//! 测试用的可编排命名服务客户端

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use flare_registry::naming::{
    DeregisterInstanceParam, GetAllServicesParam, RegisterInstanceParam, SelectInstancesParam,
    SubscribeCallback, SubscribeParam,
};
use flare_registry::{BoxError, NamingClient, RawInstance, SubscriptionId};
use tokio::sync::{Notify, Semaphore, mpsc};

/// 等待投递的最长时间
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// 断言“没有投递”前的等待时间
pub const QUIET_PERIOD: Duration = Duration::from_millis(150);

/// 由测试控制返回值的命名服务客户端，记录所有调用参数
#[derive(Default)]
pub struct ScriptedNamingClient {
    pub hosts: Mutex<Vec<RawInstance>>,
    pub services: Mutex<Vec<String>>,
    pub register_outcome: Mutex<Option<bool>>,
    pub deregister_outcome: Mutex<Option<bool>>,
    pub fail_backend: AtomicBool,
    pub fail_subscribe: AtomicBool,
    pub fail_unsubscribe: AtomicBool,

    pub select_calls: Mutex<Vec<SelectInstancesParam>>,
    pub services_calls: Mutex<Vec<GetAllServicesParam>>,
    pub register_calls: Mutex<Vec<RegisterInstanceParam>>,
    pub deregister_calls: Mutex<Vec<DeregisterInstanceParam>>,
    pub unsubscribe_calls: AtomicUsize,

    /// 设置后 `select_instances` 在返回前等待一个许可
    select_gate: Mutex<Option<Arc<Semaphore>>>,
    /// 每次进入 `select_instances` 时通知一次
    pub select_entered: Notify,

    callbacks: Mutex<HashMap<SubscriptionId, (SubscribeParam, SubscribeCallback)>>,
    next_id: AtomicU64,
}

impl ScriptedNamingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_hosts(hosts: Vec<RawInstance>) -> Arc<Self> {
        let client = Self::new();
        client.set_hosts(hosts);
        client
    }

    pub fn set_hosts(&self, hosts: Vec<RawInstance>) {
        *self.hosts.lock().unwrap() = hosts;
    }

    /// 让后续的 `select_instances` 阻塞在 `gate` 上，直到测试释放许可
    pub fn hold_selects(&self, gate: Arc<Semaphore>) {
        *self.select_gate.lock().unwrap() = Some(gate);
    }

    pub fn backend_calls(&self) -> usize {
        self.select_calls.lock().unwrap().len()
            + self.services_calls.lock().unwrap().len()
            + self.register_calls.lock().unwrap().len()
            + self.deregister_calls.lock().unwrap().len()
    }

    pub fn subscriptions(&self) -> Vec<SubscribeParam> {
        self.callbacks
            .lock()
            .unwrap()
            .values()
            .map(|(param, _)| param.clone())
            .collect()
    }

    /// 模拟后端推送：调用所有仍然有效的订阅回调
    pub fn push_change(&self) {
        let hosts = self.hosts.lock().unwrap().clone();
        let callbacks: Vec<SubscribeCallback> = self
            .callbacks
            .lock()
            .unwrap()
            .values()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(Ok(hosts.as_slice()));
        }
    }

    /// 模拟后端推送错误
    pub fn push_error(&self, message: &str) {
        let error: BoxError = message.to_string().into();
        let callbacks: Vec<SubscribeCallback> = self
            .callbacks
            .lock()
            .unwrap()
            .values()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(Err(&error));
        }
    }

    /// 取出所有回调（包括已取消的订阅），用于模拟关闭后迟到的推送
    pub fn callbacks_snapshot(&self) -> Vec<SubscribeCallback> {
        self.callbacks
            .lock()
            .unwrap()
            .values()
            .map(|(_, cb)| cb.clone())
            .collect()
    }

    fn check_backend(&self) -> Result<(), BoxError> {
        if self.fail_backend.load(Ordering::SeqCst) {
            return Err("backend unavailable".into());
        }
        Ok(())
    }
}

#[async_trait]
impl NamingClient for ScriptedNamingClient {
    async fn select_instances(
        &self,
        param: SelectInstancesParam,
    ) -> Result<Vec<RawInstance>, BoxError> {
        self.select_calls.lock().unwrap().push(param);
        self.select_entered.notify_one();
        let gate = self.select_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire_owned().await?;
        }
        self.check_backend()?;
        Ok(self.hosts.lock().unwrap().clone())
    }

    async fn get_all_services_info(
        &self,
        param: GetAllServicesParam,
    ) -> Result<Vec<String>, BoxError> {
        self.services_calls.lock().unwrap().push(param);
        self.check_backend()?;
        Ok(self.services.lock().unwrap().clone())
    }

    async fn register_instance(&self, param: RegisterInstanceParam) -> Result<bool, BoxError> {
        self.register_calls.lock().unwrap().push(param);
        self.check_backend()?;
        Ok(self.register_outcome.lock().unwrap().unwrap_or(true))
    }

    async fn deregister_instance(&self, param: DeregisterInstanceParam) -> Result<bool, BoxError> {
        self.deregister_calls.lock().unwrap().push(param);
        self.check_backend()?;
        Ok(self.deregister_outcome.lock().unwrap().unwrap_or(true))
    }

    async fn subscribe(&self, param: SubscribeParam) -> Result<SubscriptionId, BoxError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err("subscribe rejected".into());
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let callback = param.callback.clone();
        self.callbacks.lock().unwrap().insert(id, (param, callback));
        Ok(id)
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), BoxError> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unsubscribe.load(Ordering::SeqCst) {
            return Err("unsubscribe rejected".into());
        }
        self.callbacks.lock().unwrap().remove(&subscription);
        Ok(())
    }
}

/// 健康、上线、权重为 1 的原始实例
pub fn raw_instance(instance_id: &str, ip: &str, port: u16) -> RawInstance {
    RawInstance {
        instance_id: instance_id.to_string(),
        ip: ip.to_string(),
        port,
        weight: 1.0,
        healthy: true,
        enabled: true,
        ephemeral: true,
        cluster_name: "DEFAULT".to_string(),
        service_name: "order-svc".to_string(),
        metadata: HashMap::new(),
    }
}

/// 在超时时间内接收一份快照
pub async fn recv_snapshot<T>(rx: &mut mpsc::Receiver<T>) -> T {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("subscriber channel closed")
}

/// 等待一段时间后断言通道中没有快照
pub async fn assert_no_snapshot<T: std::fmt::Debug>(rx: &mut mpsc::Receiver<T>) {
    tokio::time::sleep(QUIET_PERIOD).await;
    assert!(
        matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Empty)),
        "unexpected snapshot delivered"
    );
}
