//! openvpn3-linux over the D-Bus system bus.

use zbus::proxy;
use zbus::proxy::CacheProperties;
use zbus::zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Type, Value};
use zbus::Connection;

use super::{Backend, BackendFault};
use crate::state::{
    AttentionType, InputSlot, ProfileHandle, ProfileRef, SessionHandle, SessionRef, StatusSnapshot,
};

#[proxy(
    interface = "net.openvpn.v3.configuration",
    default_service = "net.openvpn.v3.configuration",
    default_path = "/net/openvpn/v3/configuration",
    gen_blocking = false
)]
trait ConfigManager {
    fn fetch_available_configs(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    fn import(
        &self,
        name: &str,
        config_str: &str,
        single_use: bool,
        persistent: bool,
    ) -> zbus::Result<OwnedObjectPath>;
}

#[proxy(
    interface = "net.openvpn.v3.configuration",
    default_service = "net.openvpn.v3.configuration",
    gen_blocking = false
)]
trait Configuration {
    fn remove(&self) -> zbus::Result<()>;

    #[zbus(property, name = "name")]
    fn name(&self) -> zbus::Result<String>;
}

#[proxy(
    interface = "net.openvpn.v3.sessions",
    default_service = "net.openvpn.v3.sessions",
    default_path = "/net/openvpn/v3/sessions",
    gen_blocking = false
)]
trait SessionManager {
    fn fetch_available_sessions(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    fn new_tunnel(&self, config_path: &ObjectPath<'_>) -> zbus::Result<OwnedObjectPath>;
}

#[proxy(
    interface = "net.openvpn.v3.sessions",
    default_service = "net.openvpn.v3.sessions",
    gen_blocking = false
)]
trait Session {
    fn ready(&self) -> zbus::Result<()>;

    fn connect(&self) -> zbus::Result<()>;

    fn disconnect(&self) -> zbus::Result<()>;

    fn user_input_queue_get_type_group(&self) -> zbus::Result<Vec<(u32, u32)>>;

    fn user_input_queue_check(&self, kind: u32, group: u32) -> zbus::Result<Vec<u32>>;

    fn user_input_queue_fetch(
        &self,
        kind: u32,
        group: u32,
        id: u32,
    ) -> zbus::Result<(u32, u32, u32, String, String, bool)>;

    fn user_input_provide(&self, kind: u32, group: u32, id: u32, value: &str) -> zbus::Result<()>;

    #[zbus(property, name = "status")]
    fn status(&self) -> zbus::Result<RawStatus>;

    #[zbus(property, name = "config_path")]
    fn config_path(&self) -> zbus::Result<OwnedObjectPath>;

    #[zbus(property, name = "config_name")]
    fn config_name(&self) -> zbus::Result<String>;

    #[zbus(property, name = "session_name")]
    fn session_name(&self) -> zbus::Result<String>;
}

/// Wire form of the session `status` property, `(uus)`.
#[derive(Debug, Clone, Type, Value, OwnedValue)]
struct RawStatus {
    major: u32,
    minor: u32,
    message: String,
}

impl From<zbus::Error> for BackendFault {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, message, _) => Self {
                name: Some(name.to_string()),
                message: message.unwrap_or_else(|| name.to_string()),
            },
            other => Self::new(other.to_string()),
        }
    }
}

/// [`Backend`] bound to the system bus.
///
/// Property caching is disabled on every proxy: the session status must be
/// read from the service on each call.
#[derive(Clone)]
pub struct DbusBackend {
    conn: Connection,
}

impl DbusBackend {
    /// Connects to the system bus.
    pub async fn system() -> Result<Self, BackendFault> {
        let conn = Connection::system().await?;
        tracing::debug!("connected to the system bus");
        Ok(Self { conn })
    }

    async fn config_manager(&self) -> Result<ConfigManagerProxy<'static>, BackendFault> {
        Ok(ConfigManagerProxy::builder(&self.conn)
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    async fn configuration(&self, path: &str) -> Result<ConfigurationProxy<'static>, BackendFault> {
        Ok(ConfigurationProxy::builder(&self.conn)
            .path(path.to_owned())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    async fn session_manager(&self) -> Result<SessionManagerProxy<'static>, BackendFault> {
        Ok(SessionManagerProxy::builder(&self.conn)
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }

    async fn session(&self, handle: &SessionHandle) -> Result<SessionProxy<'static>, BackendFault> {
        Ok(SessionProxy::builder(&self.conn)
            .path(handle.as_str().to_owned())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }
}

impl Backend for DbusBackend {
    async fn list_profiles(&self) -> Result<Vec<ProfileRef>, BackendFault> {
        let paths = self.config_manager().await?.fetch_available_configs().await?;
        let mut profiles = Vec::with_capacity(paths.len());
        for path in paths {
            let config = self.configuration(path.as_str()).await?;
            profiles.push(ProfileRef {
                name: config.name().await?,
                handle: ProfileHandle::new(path.as_str()),
            });
        }
        Ok(profiles)
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRef>, BackendFault> {
        let paths = self
            .session_manager()
            .await?
            .fetch_available_sessions()
            .await?;
        let mut sessions = Vec::with_capacity(paths.len());
        for path in paths {
            let handle = SessionHandle::new(path.as_str());
            let proxy = self.session(&handle).await?;
            sessions.push(SessionRef {
                profile_handle: ProfileHandle::new(proxy.config_path().await?.as_str()),
                profile_name: proxy.config_name().await?,
                handle,
            });
        }
        Ok(sessions)
    }

    async fn status(&self, session: &SessionHandle) -> Result<StatusSnapshot, BackendFault> {
        let raw = self.session(session).await?.status().await?;
        Ok(StatusSnapshot::new(raw.major, raw.minor, &raw.message))
    }

    async fn session_name(&self, session: &SessionHandle) -> Result<String, BackendFault> {
        Ok(self.session(session).await?.session_name().await?)
    }

    async fn new_tunnel(&self, profile: &ProfileHandle) -> Result<SessionHandle, BackendFault> {
        let config_path = ObjectPath::try_from(profile.as_str()).map_err(zbus::Error::from)?;
        let path = self
            .session_manager()
            .await?
            .new_tunnel(&config_path)
            .await?;
        Ok(SessionHandle::new(path.as_str()))
    }

    async fn ready(&self, session: &SessionHandle) -> Result<(), BackendFault> {
        Ok(self.session(session).await?.ready().await?)
    }

    async fn connect(&self, session: &SessionHandle) -> Result<(), BackendFault> {
        Ok(self.session(session).await?.connect().await?)
    }

    async fn input_slots(&self, session: &SessionHandle) -> Result<Vec<InputSlot>, BackendFault> {
        let proxy = self.session(session).await?;
        let mut slots = Vec::new();
        for (queue_kind, queue_group) in proxy.user_input_queue_get_type_group().await? {
            for queue_id in proxy.user_input_queue_check(queue_kind, queue_group).await? {
                let (kind, group, id, variable_name, description, hidden) = proxy
                    .user_input_queue_fetch(queue_kind, queue_group, queue_id)
                    .await?;
                slots.push(InputSlot {
                    attention_type: AttentionType::from(kind),
                    group,
                    id,
                    variable_name,
                    description,
                    hidden,
                });
            }
        }
        Ok(slots)
    }

    async fn provide_input(
        &self,
        session: &SessionHandle,
        slot: &InputSlot,
        value: &str,
    ) -> Result<(), BackendFault> {
        Ok(self
            .session(session)
            .await?
            .user_input_provide(slot.attention_type.code(), slot.group, slot.id, value)
            .await?)
    }

    async fn disconnect(&self, session: &SessionHandle) -> Result<(), BackendFault> {
        Ok(self.session(session).await?.disconnect().await?)
    }

    async fn import_profile(
        &self,
        name: &str,
        contents: &str,
    ) -> Result<ProfileHandle, BackendFault> {
        let path = self
            .config_manager()
            .await?
            .import(name, contents, false, true)
            .await?;
        Ok(ProfileHandle::new(path.as_str()))
    }

    async fn remove_profile(&self, profile: &ProfileHandle) -> Result<(), BackendFault> {
        Ok(self.configuration(profile.as_str()).await?.remove().await?)
    }
}
