//! Protocol constants

/// Start of text, opens every frame
pub const STX: u8 = 0x02;

/// End of text, closes every frame
pub const ETX: u8 = 0x03;

/// Field separator, delimits field-groups
pub const FS: u8 = 0x1C;

/// Unit separator, delimits sub-fields within a field-group
pub const US: u8 = 0x1F;

/// Protocol version sent in every command frame
pub const PROTOCOL_VERSION: &str = "1.35";

/// Length of the LRC trailer that may follow ETX
pub const LRC_LEN: usize = 1;

/// Default terminal TCP port
pub const DEFAULT_PORT: u16 = 10009;

/// Default connection timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Default read timeout (seconds). Card-present transactions wait on the
/// cardholder, so this is much longer than the connect timeout.
pub const DEFAULT_READ_TIMEOUT: u64 = 120;

/// Largest response frame a channel will buffer
pub const MAX_FRAME_SIZE: usize = 8192;

/// Command codes (first field-group of a frame)
pub mod commands {
    /// EBT transaction request
    pub const DO_EBT: &str = "T04";

    /// EBT transaction response
    pub const DO_EBT_RESPONSE: &str = "T05";

    pub const INITIALIZE: &str = "A00";
    pub const INITIALIZE_RESPONSE: &str = "A01";

    pub const CANCEL: &str = "A14";
    pub const CANCEL_RESPONSE: &str = "A15";

    pub const RESET: &str = "A16";
    pub const RESET_RESPONSE: &str = "A17";
}

/// EBT transaction type codes
pub mod type_codes {
    pub const PURCHASE: &str = "01";
    pub const REFUND: &str = "02";
    pub const WITHDRAWAL: &str = "07";
    pub const BALANCE_INQUIRY: &str = "23";
}

/// EBT currency discriminators (account group, `ebt_type` sub-field)
pub mod currency_codes {
    pub const FOODSTAMPS: &str = "F";
    pub const CASH_BENEFITS: &str = "C";
    pub const VOUCHER: &str = "V";
}

/// Value of the duplicate-override sub-field when duplicates are allowed
pub const DUPLICATE_OVERRIDE: &str = "1";

/// Readable names for delimiter bytes, used in logs and diagnostics
pub fn control_name(byte: u8) -> Option<&'static str> {
    match byte {
        STX => Some("[STX]"),
        ETX => Some("[ETX]"),
        FS => Some("[FS]"),
        US => Some("[US]"),
        _ => None,
    }
}
