mod core;

pub use core::{
    Account, AccountId, AccountType, NewAccount, create_account, create_account_table,
    get_accounts_by_ids, get_asset_accounts,
};
