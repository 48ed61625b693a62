use std::ops::Deref;

use crate::os_key;

use super::Env;

#[tokio::test]
async fn mock_env_set_get_unset() {
    let env = Env::mock();
    let key = os_key("QUILL_TEST_MOCK_ENV");

    env.set_var(key.clone(), "value").await;
    let result = env.var(key.clone()).await.unwrap();
    assert_eq!(result.deref(), "value");

    env.unset_var(key.clone()).await;
    assert!(matches!(
        env.var(key).await,
        Err(std::env::VarError::NotPresent)
    ));
}

#[tokio::test]
async fn actual_env_roundtrip() {
    let env = Env::spawn();
    let key = os_key("QUILL_TEST_ACTUAL_ENV");

    unsafe { std::env::remove_var(key.as_ref()) };
    assert!(env.var(key.clone()).await.is_err());

    env.set_var(key.clone(), "value").await;
    let result = env.var(key.clone()).await.unwrap();
    assert_eq!(result.deref(), "value");
    assert_eq!(std::env::var(key.as_ref()).unwrap(), "value");

    env.unset_var(key.clone()).await;
    assert!(matches!(
        env.var(key).await,
        Err(std::env::VarError::NotPresent)
    ));
}
