//! EBT transaction descriptions

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::Error;

/// Kind of EBT transaction sent to the terminal
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Purchase,
    Refund,
    Withdrawal,
    BalanceInquiry,
}

impl TransactionType {
    /// All transaction types, in wire-table order
    pub const ALL: [TransactionType; 4] = [
        Self::Purchase,
        Self::Refund,
        Self::Withdrawal,
        Self::BalanceInquiry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Refund => "refund",
            Self::Withdrawal => "withdrawal",
            Self::BalanceInquiry => "balance_inquiry",
        }
    }

    /// Whether requests of this type move money (and therefore need an amount)
    pub fn requires_amount(self) -> bool {
        !matches!(self, Self::BalanceInquiry)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "purchase" | "sale" => Ok(Self::Purchase),
            "refund" | "return" => Ok(Self::Refund),
            "withdrawal" => Ok(Self::Withdrawal),
            "balance_inquiry" | "balance" => Ok(Self::BalanceInquiry),
            _ => Err(Error::UnknownTransactionType(s.to_string())),
        }
    }
}

/// EBT benefit the transaction draws on
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CurrencyType {
    FoodStamps,
    CashBenefits,
    Voucher,
}

impl CurrencyType {
    pub const ALL: [CurrencyType; 3] = [Self::FoodStamps, Self::CashBenefits, Self::Voucher];

    pub fn name(self) -> &'static str {
        match self {
            Self::FoodStamps => "foodstamps",
            Self::CashBenefits => "cash_benefits",
            Self::Voucher => "voucher",
        }
    }
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurrencyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f" | "foodstamps" | "food_stamps" => Ok(Self::FoodStamps),
            "c" | "cash_benefits" | "cash" => Ok(Self::CashBenefits),
            "v" | "voucher" => Ok(Self::Voucher),
            _ => Err(Error::UnknownCurrency(s.to_string())),
        }
    }
}

/// A single EBT request, fixed once handed to the request builder
///
/// # Examples
///
/// ```
/// use termwire_types::{CurrencyType, Decimal, TransactionRequest, TransactionType};
///
/// let request = TransactionRequest::purchase(1, Decimal::new(1000, 2), CurrencyType::FoodStamps)
///     .with_allow_duplicates(true);
///
/// assert_eq!(request.transaction_type, TransactionType::Purchase);
/// assert!(request.allow_duplicates);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub transaction_type: TransactionType,

    /// Caller-supplied reference echoed by the terminal (ECR reference)
    pub reference_number: u32,

    /// Required for every type except balance inquiry
    pub amount: Option<Decimal>,

    pub currency: CurrencyType,

    pub cash_back_amount: Option<Decimal>,

    /// Ask the terminal to accept a request that looks like a duplicate
    pub allow_duplicates: bool,
}

impl TransactionRequest {
    pub fn new(
        transaction_type: TransactionType,
        reference_number: u32,
        amount: Option<Decimal>,
        currency: CurrencyType,
    ) -> Self {
        Self {
            transaction_type,
            reference_number,
            amount,
            currency,
            cash_back_amount: None,
            allow_duplicates: false,
        }
    }

    pub fn purchase(reference_number: u32, amount: Decimal, currency: CurrencyType) -> Self {
        Self::new(TransactionType::Purchase, reference_number, Some(amount), currency)
    }

    pub fn refund(reference_number: u32, amount: Decimal, currency: CurrencyType) -> Self {
        Self::new(TransactionType::Refund, reference_number, Some(amount), currency)
    }

    pub fn withdrawal(reference_number: u32, amount: Decimal, currency: CurrencyType) -> Self {
        Self::new(TransactionType::Withdrawal, reference_number, Some(amount), currency)
    }

    pub fn balance_inquiry(reference_number: u32, currency: CurrencyType) -> Self {
        Self::new(TransactionType::BalanceInquiry, reference_number, None, currency)
    }

    pub fn with_cash_back(mut self, amount: Decimal) -> Self {
        self.cash_back_amount = Some(amount);
        self
    }

    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    /// Cashback with a zero amount counts as no cashback at all
    pub fn effective_cash_back(&self) -> Option<Decimal> {
        self.cash_back_amount.filter(|amount| !amount.is_zero())
    }
}

impl fmt::Display for TransactionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EBT {}[{}](ref={}",
            self.transaction_type, self.currency, self.reference_number
        )?;
        if let Some(amount) = self.amount {
            write!(f, ", amount={}", amount)?;
        }
        if let Some(cash_back) = self.effective_cash_back() {
            write!(f, ", cashback={}", cash_back)?;
        }
        write!(f, ")")
    }
}
