//! Credential conversion registry
//!
//! Converters are tried in registration order and the first one that
//! accepts the credential produces the token.

use super::types::{AuthKind, AuthToken, SecretText, UsernamePassword};
use crate::error::{Error, Result};
use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Credentials consisting of one secret value
pub trait SingleSecret {
    /// The secret
    fn secret(&self) -> &str;
}

/// Credentials consisting of a username and a secret
pub trait UsernameSecret {
    /// The username
    fn username(&self) -> &str;
    /// The password or token
    fn secret(&self) -> &str;
}

impl SingleSecret for SecretText {
    fn secret(&self) -> &str {
        &self.secret
    }
}

impl UsernameSecret for UsernamePassword {
    fn username(&self) -> &str {
        &self.username
    }

    fn secret(&self) -> &str {
        &self.password
    }
}

/// Turns one external credential shape into an [`AuthToken`]
pub trait AuthConverter: Send + Sync {
    /// Name of the credential type this converter accepts
    fn source_type(&self) -> &'static str;

    /// The token variant this converter produces
    fn produces(&self) -> AuthKind;

    /// Check whether this converter accepts the credential
    fn accepts(&self, credential: &dyn Any) -> bool;

    /// Convert the credential, `None` if it is not accepted
    fn convert(&self, credential: &dyn Any) -> Option<AuthToken>;
}

/// Converter for a single concrete credential type
struct TypedConverter<C, F> {
    produces: AuthKind,
    convert: F,
    _marker: PhantomData<fn(&C)>,
}

impl<C, F> AuthConverter for TypedConverter<C, F>
where
    C: Any,
    F: Fn(&C) -> AuthToken + Send + Sync,
{
    fn source_type(&self) -> &'static str {
        type_name::<C>()
    }

    fn produces(&self) -> AuthKind {
        self.produces
    }

    fn accepts(&self, credential: &dyn Any) -> bool {
        credential.is::<C>()
    }

    fn convert(&self, credential: &dyn Any) -> Option<AuthToken> {
        credential.downcast_ref::<C>().map(&self.convert)
    }
}

/// Ordered set of credential converters
#[derive(Clone, Default)]
pub struct AuthConverters {
    converters: Vec<Arc<dyn AuthConverter>>,
}

impl AuthConverters {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with converters for [`SecretText`] and [`UsernamePassword`]
    pub fn with_defaults() -> Self {
        let mut converters = Self::new();
        converters.register_secret::<SecretText>();
        converters.register_username_secret::<UsernamePassword>();
        converters
    }

    /// Register an arbitrary converter
    pub fn register_converter(&mut self, converter: Arc<dyn AuthConverter>) -> &mut Self {
        self.converters.push(converter);
        self
    }

    /// Register a conversion function for credential type `C`
    pub fn register<C, F>(&mut self, produces: AuthKind, convert: F) -> &mut Self
    where
        C: Any,
        F: Fn(&C) -> AuthToken + Send + Sync + 'static,
    {
        self.register_converter(Arc::new(TypedConverter {
            produces,
            convert,
            _marker: PhantomData,
        }))
    }

    /// Register a single-secret credential type, producing bearer tokens
    pub fn register_secret<C>(&mut self) -> &mut Self
    where
        C: SingleSecret + Any,
    {
        self.register::<C, _>(AuthKind::BearerToken, |c: &C| {
            AuthToken::bearer(c.secret())
        })
    }

    /// Register a username/secret credential type, producing Basic credentials
    pub fn register_username_secret<C>(&mut self) -> &mut Self
    where
        C: UsernameSecret + Any,
    {
        self.register::<C, _>(AuthKind::UserPassword, |c: &C| {
            AuthToken::user_password(c.username(), c.secret())
        })
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check if no converter is registered
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert a credential into a token
    pub fn convert<C: Any>(&self, credential: &C) -> Result<AuthToken> {
        self.convert_dyn(credential, type_name::<C>())
    }

    /// Convert a type-erased credential; `type_name` is used for the error
    pub fn convert_dyn(&self, credential: &dyn Any, type_name: &str) -> Result<AuthToken> {
        for converter in &self.converters {
            if !converter.accepts(credential) {
                continue;
            }
            if let Some(token) = converter.convert(credential) {
                debug!(
                    "Converted {} credentials to {}",
                    converter.source_type(),
                    token.kind()
                );
                return Ok(token);
            }
        }
        Err(Error::conversion(type_name))
    }

    /// Convert optional credentials; absent credentials mean anonymous access
    pub fn convert_or_anonymous<C: Any>(&self, credential: Option<&C>) -> Result<AuthToken> {
        match credential {
            Some(credential) => self.convert(credential),
            None => Ok(AuthToken::Anonymous),
        }
    }
}

impl std::fmt::Debug for AuthConverters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<_> = self.converters.iter().map(|c| c.source_type()).collect();
        f.debug_struct("AuthConverters")
            .field("converters", &sources)
            .finish()
    }
}
