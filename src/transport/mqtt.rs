//! Minimal MQTT 3.1.1 publisher
//!
//! Supports what the pipeline needs: CONNECT with clean session, QoS 0
//! PUBLISH and DISCONNECT. Keep-alive is disabled (0), so the broker never
//! expects PINGREQ from us. A background task reads the socket after CONNACK
//! and drops the connection as soon as the broker closes it.

use super::{Transport, TransportError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const PROTOCOL_NAME: &str = "MQTT";
const PROTOCOL_LEVEL: u8 = 4;
const MAX_REMAINING_LENGTH: usize = 268_435_455;

const CONNECT: u8 = 0x10;
const CONNACK: u8 = 0x20;
const PUBLISH: u8 = 0x30;
const DISCONNECT: u8 = 0xE0;

const FLAG_CLEAN_SESSION: u8 = 0x02;
const FLAG_PASSWORD: u8 = 0x40;
const FLAG_USERNAME: u8 = 0x80;

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    /// Broker host name or address
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Publish with the retain flag set
    pub retain: bool,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            broker: String::new(),
            port: 1883,
            client_id: format!("sri-{}", uuid::Uuid::new_v4()),
            username: None,
            password: None,
            retain: false,
        }
    }
}

type SharedWriter = Arc<Mutex<Option<OwnedWriteHalf>>>;

/// MQTT publisher over a single TCP connection.
pub struct MqttTransport {
    settings: MqttSettings,
    writer: SharedWriter,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl MqttTransport {
    pub fn new(settings: MqttSettings) -> Self {
        Self {
            settings,
            writer: Arc::new(Mutex::new(None)),
            watcher: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &MqttSettings {
        &self.settings
    }

    pub async fn is_connected(&self) -> bool {
        self.writer.lock().await.is_some()
    }

    /// Open the TCP connection and complete the CONNECT/CONNACK handshake.
    pub async fn connect(&self) -> Result<(), TransportError> {
        let mut stream =
            TcpStream::connect((self.settings.broker.as_str(), self.settings.port)).await?;
        stream.write_all(&encode_connect(&self.settings)?).await?;

        let mut ack = [0u8; 4];
        stream.read_exact(&mut ack).await?;
        if ack[0] != CONNACK || ack[1] != 0x02 {
            return Err(TransportError::Protocol(format!(
                "expected CONNACK, got {:02x?}",
                ack
            )));
        }
        if ack[3] != 0 {
            tracing::warn!(code = ack[3], broker = %self.settings.broker, "connection refused");
            return Err(TransportError::Refused(ack[3]));
        }

        tracing::info!(
            broker = %self.settings.broker,
            port = self.settings.port,
            client_id = %self.settings.client_id,
            "connected to MQTT broker"
        );
        let (reader, writer) = stream.into_split();
        let mut watcher = self.watcher.lock().await;
        if let Some(previous) = watcher.take() {
            previous.abort();
        }
        *self.writer.lock().await = Some(writer);
        *watcher = Some(tokio::spawn(watch_broker(
            reader,
            Arc::clone(&self.writer),
            self.settings.broker.clone(),
        )));
        Ok(())
    }

    /// Send DISCONNECT and close the connection. No-op when not connected.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        if let Some(watcher) = self.watcher.lock().await.take() {
            watcher.abort();
        }
        let taken = self.writer.lock().await.take();
        if let Some(mut stream) = taken {
            stream.write_all(&[DISCONNECT, 0x00]).await?;
            stream.shutdown().await?;
            tracing::info!(broker = %self.settings.broker, "disconnected from MQTT broker");
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        let packet = encode_publish(topic, payload.as_bytes(), self.settings.retain)?;
        let mut guard = self.writer.lock().await;
        let stream = guard.as_mut().ok_or(TransportError::NotConnected)?;
        if let Err(e) = stream.write_all(&packet).await {
            // The connection is unusable after a failed write.
            *guard = None;
            return Err(e.into());
        }
        tracing::debug!(topic, bytes = payload.len(), "published");
        Ok(())
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.get_mut().take() {
            watcher.abort();
        }
    }
}

/// Read until the broker closes the socket, then drop the writer so later
/// publishes fail with `NotConnected`. A QoS 0 publisher expects no inbound
/// packets, so anything read is discarded.
async fn watch_broker(mut reader: OwnedReadHalf, writer: SharedWriter, broker: String) {
    let mut buf = [0u8; 512];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "MQTT read failed");
                break;
            }
        }
    }
    if writer.lock().await.take().is_some() {
        tracing::warn!(broker = %broker, "broker closed the connection");
    }
}

// ---------------------------------------------------------------------------
// Packet encoding
// ---------------------------------------------------------------------------

fn encode_remaining_length(mut len: usize, out: &mut Vec<u8>) -> Result<(), TransportError> {
    if len > MAX_REMAINING_LENGTH {
        return Err(TransportError::Protocol(format!(
            "packet of {} bytes exceeds the MQTT limit",
            len
        )));
    }
    loop {
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if len == 0 {
            return Ok(());
        }
    }
}

fn encode_string(s: &str, out: &mut Vec<u8>) -> Result<(), TransportError> {
    let len = u16::try_from(s.len())
        .map_err(|_| TransportError::Protocol(format!("string of {} bytes too long", s.len())))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn frame(header: u8, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
    let mut packet = Vec::with_capacity(body.len() + 5);
    packet.push(header);
    encode_remaining_length(body.len(), &mut packet)?;
    packet.extend(body);
    Ok(packet)
}

pub(crate) fn encode_connect(settings: &MqttSettings) -> Result<Vec<u8>, TransportError> {
    let mut flags = FLAG_CLEAN_SESSION;
    if settings.username.is_some() {
        flags |= FLAG_USERNAME;
        if settings.password.is_some() {
            flags |= FLAG_PASSWORD;
        }
    }

    let mut body = Vec::new();
    encode_string(PROTOCOL_NAME, &mut body)?;
    body.push(PROTOCOL_LEVEL);
    body.push(flags);
    body.extend_from_slice(&0u16.to_be_bytes());
    encode_string(&settings.client_id, &mut body)?;
    if let Some(username) = &settings.username {
        encode_string(username, &mut body)?;
        if let Some(password) = &settings.password {
            encode_string(password, &mut body)?;
        }
    }
    frame(CONNECT, body)
}

pub(crate) fn encode_publish(
    topic: &str,
    payload: &[u8],
    retain: bool,
) -> Result<Vec<u8>, TransportError> {
    if topic.is_empty() || topic.contains(['+', '#']) {
        return Err(TransportError::Protocol(format!(
            "invalid publish topic '{}'",
            topic
        )));
    }
    let mut body = Vec::with_capacity(topic.len() + payload.len() + 2);
    encode_string(topic, &mut body)?;
    body.extend_from_slice(payload);
    frame(if retain { PUBLISH | 0x01 } else { PUBLISH }, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn settings(port: u16) -> MqttSettings {
        MqttSettings {
            broker: "127.0.0.1".to_string(),
            port,
            client_id: "sri-test".to_string(),
            ..MqttSettings::default()
        }
    }

    /// Read one packet: (first byte, body).
    async fn read_packet(stream: &mut TcpStream) -> (u8, Vec<u8>) {
        let header = stream.read_u8().await.unwrap();
        let mut len = 0usize;
        let mut multiplier = 1usize;
        loop {
            let byte = stream.read_u8().await.unwrap();
            len += (byte & 0x7f) as usize * multiplier;
            if byte & 0x80 == 0 {
                break;
            }
            multiplier *= 128;
        }
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await.unwrap();
        (header, body)
    }

    #[test]
    fn remaining_length_uses_continuation_bytes() {
        let mut out = Vec::new();
        encode_remaining_length(0, &mut out).unwrap();
        assert_eq!(out, vec![0x00]);

        out.clear();
        encode_remaining_length(321, &mut out).unwrap();
        assert_eq!(out, vec![0xC1, 0x02]);

        out.clear();
        encode_remaining_length(MAX_REMAINING_LENGTH, &mut out).unwrap();
        assert_eq!(out, vec![0xFF, 0xFF, 0xFF, 0x7F]);

        assert!(encode_remaining_length(MAX_REMAINING_LENGTH + 1, &mut out).is_err());
    }

    #[test]
    fn connect_packet_layout() {
        let packet = encode_connect(&settings(1883)).unwrap();
        assert_eq!(packet[0], CONNECT);
        assert_eq!(packet[1] as usize, packet.len() - 2);
        assert_eq!(&packet[2..8], &[0x00, 0x04, b'M', b'Q', b'T', b'T']);
        assert_eq!(packet[8], PROTOCOL_LEVEL);
        assert_eq!(packet[9], FLAG_CLEAN_SESSION);
        assert_eq!(&packet[10..12], &[0x00, 0x00]);
        assert_eq!(&packet[12..14], &[0x00, 0x08]);
        assert_eq!(&packet[14..], b"sri-test");
    }

    #[test]
    fn connect_with_credentials_sets_flags() {
        let mut s = settings(1883);
        s.username = Some("user".to_string());
        s.password = Some("secret".to_string());
        let packet = encode_connect(&s).unwrap();
        assert_eq!(packet[9], FLAG_CLEAN_SESSION | FLAG_USERNAME | FLAG_PASSWORD);
        assert!(packet.ends_with(b"\x00\x04user\x00\x06secret"));
    }

    #[test]
    fn publish_packet_layout() {
        let packet = encode_publish("a/b", b"hi", false).unwrap();
        assert_eq!(packet, vec![PUBLISH, 7, 0x00, 0x03, b'a', b'/', b'b', b'h', b'i']);

        let retained = encode_publish("a/b", b"hi", true).unwrap();
        assert_eq!(retained[0], PUBLISH | 0x01);
    }

    #[test]
    fn publish_rejects_wildcard_topics() {
        assert!(encode_publish("resonance/+/pv", b"x", false).is_err());
        assert!(encode_publish("", b"x", false).is_err());
    }

    #[tokio::test]
    async fn publish_before_connect_fails() {
        let transport = MqttTransport::new(settings(1));
        let err = transport.publish("t", "p").await.unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
    }

    #[tokio::test]
    async fn connect_publish_disconnect_against_local_broker() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let broker = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let (connect, _) = read_packet(&mut stream).await;
            assert_eq!(connect, CONNECT);
            stream.write_all(&[CONNACK, 0x02, 0x00, 0x00]).await.unwrap();

            let (publish, body) = read_packet(&mut stream).await;
            let (disconnect, _) = read_packet(&mut stream).await;
            (publish, body, disconnect)
        });

        let transport = MqttTransport::new(settings(port));
        transport.connect().await.unwrap();
        assert!(transport.is_connected().await);
        transport.publish("resonance/sri/ev", "payload").await.unwrap();
        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected().await);

        let (publish, body, disconnect) = broker.await.unwrap();
        assert_eq!(publish, PUBLISH);
        assert_eq!(&body[2..18], b"resonance/sri/ev");
        assert_eq!(&body[18..], b"payload");
        assert_eq!(disconnect, DISCONNECT);
    }

    #[tokio::test]
    async fn broker_side_close_is_detected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_packet(&mut stream).await;
            stream.write_all(&[CONNACK, 0x02, 0x00, 0x00]).await.unwrap();
            // dropping the stream closes the connection
        });

        let transport = MqttTransport::new(settings(port));
        transport.connect().await.unwrap();

        for _ in 0..100 {
            if !transport.is_connected().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!transport.is_connected().await);
        let err = transport.publish("resonance/sri/pv", "payload").await.unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
    }

    #[tokio::test]
    async fn refused_connection_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_packet(&mut stream).await;
            stream.write_all(&[CONNACK, 0x02, 0x00, 0x05]).await.unwrap();
        });

        let transport = MqttTransport::new(settings(port));
        let err = transport.connect().await.unwrap_err();
        assert!(matches!(err, TransportError::Refused(5)));
        assert!(!transport.is_connected().await);
    }
}
