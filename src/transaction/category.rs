//! The closed set of categories a mobile-money transaction can belong to.

use std::fmt::Display;

/// One of the ten fixed transaction categories.
///
/// The declaration order is significant: it is the order used for chart axes
/// and for breaking ties when picking the dominant category. Use
/// [CategoryTag::ALL] wherever that order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryTag {
    IncomingMoney,
    BankDeposits,
    BankTransfers,
    AirtimeBillPayments,
    BundlePurchases,
    CashPowerBillPayments,
    CodeHolderPayments,
    ThirdPartyTransactions,
    AgentWithdrawals,
    Other,
}

impl CategoryTag {
    /// Every category, in display order.
    pub const ALL: [CategoryTag; 10] = [
        CategoryTag::IncomingMoney,
        CategoryTag::BankDeposits,
        CategoryTag::BankTransfers,
        CategoryTag::AirtimeBillPayments,
        CategoryTag::BundlePurchases,
        CategoryTag::CashPowerBillPayments,
        CategoryTag::CodeHolderPayments,
        CategoryTag::ThirdPartyTransactions,
        CategoryTag::AgentWithdrawals,
        CategoryTag::Other,
    ];

    /// The label used by the record source and shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            CategoryTag::IncomingMoney => "Incoming Money",
            CategoryTag::BankDeposits => "Bank Deposits",
            CategoryTag::BankTransfers => "Bank Transfers",
            CategoryTag::AirtimeBillPayments => "Airtime Bill Payments",
            CategoryTag::BundlePurchases => "Internet and Voice Bundle Purchases",
            CategoryTag::CashPowerBillPayments => "Cash Power Bill Payments",
            CategoryTag::CodeHolderPayments => "Payments to Code Holders",
            CategoryTag::ThirdPartyTransactions => "Transactions Initiated by Third Parties",
            CategoryTag::AgentWithdrawals => "Withdrawals from Agents",
            CategoryTag::Other => "Other",
        }
    }

    /// The color used for this category in charts and table badges.
    pub fn color(self) -> &'static str {
        match self {
            CategoryTag::IncomingMoney => "#4CAF50",
            CategoryTag::BankDeposits => "#9C27B0",
            CategoryTag::BankTransfers => "#2196F3",
            CategoryTag::AirtimeBillPayments => "#F44336",
            CategoryTag::BundlePurchases => "#FF9800",
            CategoryTag::CashPowerBillPayments => "#795548",
            CategoryTag::CodeHolderPayments => "#607D8B",
            CategoryTag::ThirdPartyTransactions => "#00BCD4",
            CategoryTag::AgentWithdrawals => "#FFEB3B",
            CategoryTag::Other => "#9E9E9E",
        }
    }

    /// Look up a category by its exact label.
    ///
    /// Returns `None` for anything that is not one of the ten labels.
    pub fn from_label(label: &str) -> Option<CategoryTag> {
        CategoryTag::ALL
            .into_iter()
            .find(|category| category.label() == label)
    }

    /// The position of this category in [CategoryTag::ALL].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryTag;

    #[test]
    fn labels_round_trip() {
        for category in CategoryTag::ALL {
            assert_eq!(CategoryTag::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn unknown_label_is_none() {
        assert_eq!(CategoryTag::from_label("Lottery Winnings"), None);
        assert_eq!(CategoryTag::from_label("incoming money"), None);
        assert_eq!(CategoryTag::from_label(""), None);
    }

    #[test]
    fn index_matches_display_order() {
        for (i, category) in CategoryTag::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            CategoryTag::ALL.into_iter().map(CategoryTag::label).collect();

        assert_eq!(labels.len(), CategoryTag::ALL.len());
    }
}
