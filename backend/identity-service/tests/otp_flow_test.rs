// Integration tests for phone verification codes
//
// The OTP store runs in-process on the Tokio clock, so TTL expiry is driven
// with paused time instead of real sleeps.

use async_trait::async_trait;
use identity_service::db::{MemoryOtpStore, OtpStore};
use identity_service::services::{OtpService, SmsChannel};
use identity_service::{ErrorKind, IdentityError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PHONE: &str = "+15551234567";
const FROM: &str = "+15550001111";

/// Records every message and optionally fails delivery
#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(String, String, String)>>,
    fail: bool,
}

impl RecordingChannel {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn last_code(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let (_, _, body) = sent.last().expect("a message was sent");
        body.rsplit(' ').next().unwrap().to_string()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsChannel for RecordingChannel {
    async fn send(&self, to: &str, from: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), from.to_string(), body.to_string()));
        if self.fail {
            return Err(IdentityError::DeliveryFailed("carrier rejected".to_string()));
        }
        Ok(())
    }
}

/// Yields to the scheduler after every read, so concurrent verifications
/// interleave between reading and consuming the code
#[derive(Default)]
struct InterleavingStore {
    inner: MemoryOtpStore,
}

#[async_trait]
impl OtpStore for InterleavingStore {
    async fn put(&self, phone: &str, code: &str, ttl: Duration) -> Result<()> {
        self.inner.put(phone, code, ttl).await
    }

    async fn get(&self, phone: &str) -> Result<Option<String>> {
        let code = self.inner.get(phone).await?;
        tokio::task::yield_now().await;
        Ok(code)
    }

    async fn delete(&self, phone: &str) -> Result<bool> {
        self.inner.delete(phone).await
    }
}

fn service(channel: Arc<RecordingChannel>) -> OtpService {
    OtpService::new(Arc::new(MemoryOtpStore::new()), channel, FROM.to_string())
}

fn wrong(code: &str) -> String {
    if code == "999999" {
        "100000".to_string()
    } else {
        "999999".to_string()
    }
}

#[tokio::test]
async fn correct_code_verifies_exactly_once() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    otp.send_otp(PHONE).await.unwrap();
    let code = channel.last_code();

    {
        let sent = channel.sent.lock().unwrap();
        let (to, from, body) = &sent[0];
        assert_eq!(to, PHONE);
        assert_eq!(from, FROM);
        assert_eq!(body, &format!("Your verification code is: {code}"));
    }

    assert!(otp.verify_otp(PHONE, &code).await.unwrap());
    assert!(!otp.verify_otp(PHONE, &code).await.unwrap());
}

#[tokio::test]
async fn wrong_code_leaves_original_valid() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    otp.send_otp(PHONE).await.unwrap();
    let code = channel.last_code();

    assert!(!otp.verify_otp(PHONE, &wrong(&code)).await.unwrap());
    assert!(!otp.verify_otp(PHONE, &wrong(&code)).await.unwrap());
    assert!(otp.verify_otp(PHONE, &code).await.unwrap());
}

#[tokio::test]
async fn resend_overwrites_previous_code() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    otp.send_otp(PHONE).await.unwrap();
    let first = channel.last_code();
    otp.send_otp(PHONE).await.unwrap();
    let second = channel.last_code();
    assert_eq!(channel.count(), 2);

    if first != second {
        assert!(!otp.verify_otp(PHONE, &first).await.unwrap());
    }
    assert!(otp.verify_otp(PHONE, &second).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn code_expires_after_five_minutes() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    otp.send_otp(PHONE).await.unwrap();
    let code = channel.last_code();

    tokio::time::advance(Duration::from_secs(301)).await;
    assert!(!otp.verify_otp(PHONE, &code).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn code_valid_until_ttl_elapses() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    otp.send_otp(PHONE).await.unwrap();
    let code = channel.last_code();

    tokio::time::advance(Duration::from_secs(290)).await;
    assert!(!otp.verify_otp(PHONE, &wrong(&code)).await.unwrap());
    assert!(otp.verify_otp(PHONE, &code).await.unwrap());
}

#[tokio::test]
async fn failed_delivery_leaves_nothing_to_verify() {
    let channel = Arc::new(RecordingChannel::failing());
    let otp = service(channel.clone());

    let err = otp.send_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, IdentityError::DeliveryFailed(_)));
    assert_eq!(err.kind(), ErrorKind::ExternalDeliveryFailure);

    let code = channel.last_code();
    assert!(!otp.verify_otp(PHONE, &code).await.unwrap());
    assert!(!otp.verify_otp(PHONE, &wrong(&code)).await.unwrap());
}

#[tokio::test]
async fn phones_do_not_share_codes() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    otp.send_otp(PHONE).await.unwrap();
    let code = channel.last_code();

    assert!(!otp.verify_otp("+15559990000", &code).await.unwrap());
    assert!(otp.verify_otp(PHONE, &code).await.unwrap());
}

#[tokio::test]
async fn malformed_phone_is_rejected_before_sending() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = service(channel.clone());

    let err = otp.send_otp("555-1234").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);
    assert_eq!(channel.count(), 0);
}

#[tokio::test]
async fn concurrent_verification_succeeds_once() {
    let channel = Arc::new(RecordingChannel::default());
    let otp = OtpService::new(
        Arc::new(InterleavingStore::default()),
        channel.clone(),
        FROM.to_string(),
    );

    otp.send_otp(PHONE).await.unwrap();
    let code = channel.last_code();

    let (a, b) = tokio::join!(otp.verify_otp(PHONE, &code), otp.verify_otp(PHONE, &code));

    let verified = [a.unwrap(), b.unwrap()].iter().filter(|ok| **ok).count();
    assert_eq!(verified, 1);
    assert!(!otp.verify_otp(PHONE, &code).await.unwrap());
}
