mod classes;
mod data;
mod event;
mod ids;
mod range;
mod transaction;
mod view;

pub use classes::{
    AccountKind, CategoryClass, DepositClass, PayeeClass, SecurityClass, TaxBasisClass,
    TaxMapping, tax_basis_for,
};
pub use data::{
    Account, AccountClass, AutoExpense, Category, Currency, DataSet, DepositRate, ExchangeRate,
    Payee, Security, SecurityPrice, Tag,
};
pub use event::{Event, EventKind, EventStamp};
pub use ids::{
    AccountId, CategoryId, CurrencyId, EventId, HoldingKey, PayeeId, SecurityId, TagId,
    TransactionId,
};
pub use range::DateRange;
pub use transaction::{Direction, Transaction, TransactionAsset};
pub use view::DataView;
