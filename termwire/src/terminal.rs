//! High-level terminal interface

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use termwire_core::{
    checksum, constants::commands, decoder, framer, AdminCommand, RequestBuilder, ResponseKind,
    ResponseMessage,
};
use termwire_transport::DeviceChannel;
use termwire_types::TransactionRequest;

use crate::error::{Error, Result};

/// Payment terminal
///
/// Owns the channel behind an async mutex, so at most one request/response
/// cycle runs at a time: acquire, send, wait for the full response, decode,
/// release. Requests are validated before the channel is acquired.
///
/// # Examples
///
/// ```no_run
/// use termwire::{CurrencyType, TcpChannel, Terminal, TransactionRequest, DEFAULT_PORT};
///
/// #[tokio::main]
/// async fn main() -> termwire::Result<()> {
///     let terminal = Terminal::new(TcpChannel::new("192.168.1.50", DEFAULT_PORT));
///     terminal.connect().await?;
///
///     let request = TransactionRequest::balance_inquiry(5, CurrencyType::FoodStamps);
///     let response = terminal
///         .execute_observed(&request, |bytes| println!("-> {}", termwire_core::framer::render(bytes)))
///         .await?;
///     println!("{}", response);
///
///     terminal.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Terminal<C: DeviceChannel> {
    channel: Mutex<C>,
    builder: RequestBuilder,
    append_lrc: bool,
}

impl<C: DeviceChannel> Terminal<C> {
    /// Wrap a channel (LRC trailer on, default protocol version)
    pub fn new(channel: C) -> Self {
        Self {
            channel: Mutex::new(channel),
            builder: RequestBuilder::new(),
            append_lrc: true,
        }
    }

    /// Append an LRC byte after ETX on outbound frames (default: true)
    pub fn with_lrc(mut self, append_lrc: bool) -> Self {
        self.append_lrc = append_lrc;
        self
    }

    /// Set protocol version written into outbound frames
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.builder = self.builder.with_version(version);
        self
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Check if connected
    pub async fn is_connected(&self) -> bool {
        self.channel.lock().await.is_connected()
    }

    /// Open the channel
    pub async fn connect(&self) -> Result<()> {
        let mut channel = self.channel.lock().await;

        info!("Connecting to {}...", channel.remote_addr());
        channel.connect().await?;
        info!("Connected to {}", channel.remote_addr());

        Ok(())
    }

    /// Close the channel
    pub async fn disconnect(&self) -> Result<()> {
        let mut channel = self.channel.lock().await;
        if !channel.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", channel.remote_addr());
        channel.disconnect().await?;

        Ok(())
    }

    /// Run one EBT transaction
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The request fails validation (nothing is sent)
    /// - The channel is closed or the transport fails
    /// - The reply is not a well-formed transaction frame
    pub async fn execute(&self, request: &TransactionRequest) -> Result<ResponseMessage> {
        self.execute_observed(request, |_| {}).await
    }

    /// Run one EBT transaction, handing the exact outbound bytes to `observer`
    /// just before they are sent
    pub async fn execute_observed<F>(
        &self,
        request: &TransactionRequest,
        observer: F,
    ) -> Result<ResponseMessage>
    where
        F: FnOnce(&[u8]) + Send,
    {
        let frame = self.builder.build(request)?;
        debug!("Executing {}", request);

        self.exchange(frame, ResponseKind::Transaction, commands::DO_EBT_RESPONSE, observer)
            .await
    }

    /// Initialize the terminal
    pub async fn initialize(&self) -> Result<ResponseMessage> {
        self.admin_observed(AdminCommand::Initialize, |_| {}).await
    }

    /// Cancel the transaction in progress
    pub async fn cancel(&self) -> Result<ResponseMessage> {
        self.admin_observed(AdminCommand::Cancel, |_| {}).await
    }

    /// Reset the terminal to its idle screen
    pub async fn reset(&self) -> Result<ResponseMessage> {
        warn!("Resetting terminal...");
        self.admin_observed(AdminCommand::Reset, |_| {}).await
    }

    /// Send an administrative command, handing the outbound bytes to `observer`
    pub async fn admin_observed<F>(&self, command: AdminCommand, observer: F) -> Result<ResponseMessage>
    where
        F: FnOnce(&[u8]) + Send,
    {
        let frame = self.builder.build_admin(command);
        debug!("Sending {}", command);

        self.exchange(frame, command.response_kind(), command.response_code(), observer)
            .await
    }

    /// Release the terminal and return its channel
    pub fn into_inner(self) -> C {
        self.channel.into_inner()
    }

    async fn exchange<F>(
        &self,
        frame: Bytes,
        kind: ResponseKind,
        expected: &'static str,
        observer: F,
    ) -> Result<ResponseMessage>
    where
        F: FnOnce(&[u8]) + Send,
    {
        let outbound = if self.append_lrc {
            Bytes::from(checksum::seal(&frame))
        } else {
            frame
        };

        let mut channel = self.channel.lock().await;
        if !channel.is_connected() {
            return Err(Error::NotConnected);
        }

        observer(&outbound[..]);

        trace!("Sending: {}", framer::render(&outbound));
        channel.send(&outbound).await.map_err(transport_failure)?;

        let raw = channel.receive().await.map_err(transport_failure)?;
        let response = decoder::decode(&raw, kind)?;

        drop(channel);

        trace!("Received: {:?}", response);

        if response.command() != Some(expected) {
            return Err(Error::UnexpectedResponse {
                expected,
                actual: response.command().unwrap_or_default().to_string(),
            });
        }

        if response.lrc_valid() == Some(false) {
            warn!("LRC mismatch on {} response", kind);
        }

        Ok(response)
    }
}

fn transport_failure(err: termwire_transport::Error) -> Error {
    if err.requires_reconnect() {
        warn!(error = %err, "Channel lost, reconnect before the next request");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    use async_trait::async_trait;
    use bytes::BytesMut;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use termwire_core::{Status, ValidationError};
    use termwire_types::{CurrencyType, Decimal};

    mock! {
        pub Channel {}

        #[async_trait]
        impl DeviceChannel for Channel {
            async fn connect(&mut self) -> termwire_transport::Result<()>;
            async fn disconnect(&mut self) -> termwire_transport::Result<()>;
            fn is_connected(&self) -> bool;
            async fn send(&mut self, data: &[u8]) -> termwire_transport::Result<()>;
            async fn receive(&mut self) -> termwire_transport::Result<BytesMut>;
            fn remote_addr(&self) -> String;
        }
    }

    fn approved_reply() -> Vec<u8> {
        checksum::seal(&framer::encode(&[
            vec!["T05"],
            vec!["1.35"],
            vec!["000000"],
            vec!["OK"],
            vec!["00", "APPROVAL", "123456"],
            vec!["01"],
        ]))
    }

    fn connected_channel(reply: Vec<u8>) -> MockChannel {
        let mut channel = MockChannel::new();
        channel.expect_is_connected().return_const(true);
        channel.expect_send().times(1).returning(|_| Ok(()));
        channel
            .expect_receive()
            .times(1)
            .returning(move || Ok(BytesMut::from(&reply[..])));
        channel
    }

    fn ten() -> Decimal {
        Decimal::new(1000, 2)
    }

    #[tokio::test]
    async fn test_observer_sees_exact_frame() {
        let terminal = Terminal::new(connected_channel(approved_reply()));
        let sent = Arc::new(StdMutex::new(Vec::new()));

        let request = TransactionRequest::purchase(1, ten(), CurrencyType::FoodStamps)
            .with_allow_duplicates(true);
        let captured = sent.clone();
        let response = terminal
            .execute_observed(&request, move |bytes| captured.lock().unwrap().extend_from_slice(bytes))
            .await
            .unwrap();

        let sent = sent.lock().unwrap();
        assert!(framer::render(&sent).starts_with(
            "[STX]T04[FS]1.35[FS]01[FS]1000[FS][US][US][US]F[US][US]1[FS]1[FS][FS][ETX]"
        ));
        // LRC trailer follows ETX
        assert_eq!(sent.len(), framer::frame_end(&sent).unwrap() + 1);

        assert_eq!(response.response_code, "00");
        assert_eq!(response.status, Status::Approved);
        assert_eq!(response.lrc_valid(), Some(true));
    }

    #[tokio::test]
    async fn test_send_receives_built_bytes() {
        let request = TransactionRequest::refund(9, ten(), CurrencyType::FoodStamps);
        let expected = RequestBuilder::new().build(&request).unwrap().to_vec();

        let mut channel = MockChannel::new();
        channel.expect_is_connected().return_const(true);
        channel
            .expect_send()
            .withf(move |data| data == expected.as_slice())
            .times(1)
            .returning(|_| Ok(()));
        let reply = approved_reply();
        channel
            .expect_receive()
            .returning(move || Ok(BytesMut::from(&reply[..])));

        let terminal = Terminal::new(channel).with_lrc(false);
        let response = terminal.execute(&request).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_validation_error_sends_nothing() {
        let mut channel = MockChannel::new();
        channel.expect_is_connected().never();
        channel.expect_send().never();

        let terminal = Terminal::new(channel);
        let request = TransactionRequest::balance_inquiry(8, CurrencyType::Voucher);

        let err = terminal.execute(&request).await.unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::InvalidCombination { field: "currency", .. })
        ));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_not_connected() {
        let mut channel = MockChannel::new();
        channel.expect_is_connected().return_const(false);
        channel.expect_send().never();

        let terminal = Terminal::new(channel);
        let request = TransactionRequest::purchase(1, ten(), CurrencyType::Voucher);

        let err = terminal.execute(&request).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_frame_error() {
        // ETX missing
        let truncated = b"\x02T05\x1c1.35\x1c000000".to_vec();
        let terminal = Terminal::new(connected_channel(truncated));
        let request = TransactionRequest::withdrawal(12, ten(), CurrencyType::CashBenefits);

        let err = terminal.execute(&request).await.unwrap_err();
        assert!(err.as_frame().is_some());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut channel = MockChannel::new();
        channel.expect_is_connected().return_const(true);
        channel.expect_send().returning(|_| Ok(()));
        channel
            .expect_receive()
            .returning(|| Err(termwire_transport::Error::ReadTimeout));

        let terminal = Terminal::new(channel);
        let request = TransactionRequest::balance_inquiry(6, CurrencyType::CashBenefits);

        let err = terminal.execute(&request).await.unwrap_err();
        assert!(matches!(err, Error::Transport(termwire_transport::Error::ReadTimeout)));
        assert!(err.is_recoverable());
        assert!(!err.requires_reconnect());
    }

    #[tokio::test]
    async fn test_closed_channel_requires_reconnect() {
        let mut channel = MockChannel::new();
        channel.expect_is_connected().return_const(true);
        channel.expect_send().returning(|_| Ok(()));
        channel
            .expect_receive()
            .returning(|| Err(termwire_transport::Error::ConnectionClosed));

        let terminal = Terminal::new(channel);
        let request = TransactionRequest::balance_inquiry(5, CurrencyType::FoodStamps);

        let err = terminal.execute(&request).await.unwrap_err();
        assert!(matches!(err, Error::Transport(termwire_transport::Error::ConnectionClosed)));
        assert!(err.requires_reconnect());
    }

    #[tokio::test]
    async fn test_cancel_uses_cancel_table() {
        let reply = framer::encode(&[vec!["A15"], vec!["1.35"], vec!["1"]]).to_vec();
        let terminal = Terminal::new(connected_channel(reply));

        let response = terminal.cancel().await.unwrap();
        assert_eq!(response.kind, ResponseKind::Cancel);
        assert_eq!(response.status, Status::Failed);
    }

    #[tokio::test]
    async fn test_initialize_sends_admin_frame() {
        let reply = framer::encode(&[vec!["A01"], vec!["1.35"], vec!["000000"], vec!["OK"]]).to_vec();
        let terminal = Terminal::new(connected_channel(reply))
            .with_lrc(false)
            .with_version("1.28");

        let sent = Arc::new(StdMutex::new(String::new()));
        let captured = sent.clone();
        let response = terminal
            .admin_observed(AdminCommand::Initialize, move |bytes| {
                *captured.lock().unwrap() = framer::render(bytes);
            })
            .await
            .unwrap();

        assert_eq!(*sent.lock().unwrap(), "[STX]A00[FS]1.28[ETX]");
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.response_text, "OK");
    }

    #[tokio::test]
    async fn test_unexpected_response_command() {
        let reply = framer::encode(&[vec!["A01"], vec!["1.35"], vec!["000000"]]).to_vec();
        let terminal = Terminal::new(connected_channel(reply));

        let err = terminal.reset().await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponse { expected: "A17", ref actual } if actual == "A01"
        ));
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let mut channel = MockChannel::new();
        channel.expect_remote_addr().return_const("10.0.0.5:10009".to_string());
        channel.expect_connect().times(1).returning(|| Ok(()));
        channel.expect_is_connected().return_const(true);
        channel.expect_disconnect().times(1).returning(|| Ok(()));

        let terminal = Terminal::new(channel);
        terminal.connect().await.unwrap();
        assert!(terminal.is_connected().await);
        terminal.disconnect().await.unwrap();
    }
}
