//! Canned report catalog.
//!
//! The set of supported reports is a closed enumeration: each variant
//! carries its fixed query text, so adding a report is a compile-time change
//! and a typo in a report name cannot reach the database.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    AllTransactions,
    FraudTransactions,
    FraudAmountByMerchantState,
    FraudAmountByMerchant,
    FraudCasesByGender,
    MonthlyFraudTrend,
    FraudAmountByAgeGroup,
    TopClientsByFraudAmount,
    MovingAverageByClient,
    FraudByTransactionTime,
    TopFraudCardBrand,
    TopUsersByErrors,
}

impl Report {
    pub const ALL: [Report; 12] = [
        Report::AllTransactions,
        Report::FraudTransactions,
        Report::FraudAmountByMerchantState,
        Report::FraudAmountByMerchant,
        Report::FraudCasesByGender,
        Report::MonthlyFraudTrend,
        Report::FraudAmountByAgeGroup,
        Report::TopClientsByFraudAmount,
        Report::MovingAverageByClient,
        Report::FraudByTransactionTime,
        Report::TopFraudCardBrand,
        Report::TopUsersByErrors,
    ];

    /// Human label shown in the report picker.
    pub fn label(&self) -> &'static str {
        match self {
            Report::AllTransactions => "All transactions",
            Report::FraudTransactions => "Fraud transactions",
            Report::FraudAmountByMerchantState => "Fraud amount by merchant state",
            Report::FraudAmountByMerchant => "Fraud amount by merchant",
            Report::FraudCasesByGender => "Fraud cases by gender",
            Report::MonthlyFraudTrend => "Monthly fraud trend",
            Report::FraudAmountByAgeGroup => "Fraud amount by age group",
            Report::TopClientsByFraudAmount => "Top clients by fraud amount",
            Report::MovingAverageByClient => "Moving average by client",
            Report::FraudByTransactionTime => "Fraud by transaction time",
            Report::TopFraudCardBrand => "Top fraud card brand",
            Report::TopUsersByErrors => "Top users by transaction errors",
        }
    }

    /// Resolve a picker label back to its report.
    pub fn from_label(label: &str) -> Option<Report> {
        Report::ALL.into_iter().find(|r| r.label() == label)
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Report::AllTransactions => r#"SELECT * FROM "transaction" LIMIT 100"#,

            Report::FraudTransactions => {
                r#"SELECT * FROM "transaction"
                   WHERE fraud_classification = 'Fraud'
                   LIMIT 100"#
            }

            Report::FraudAmountByMerchantState => {
                r#"SELECT m.merchant_state, SUM(t.amount) AS fraud_amount
                   FROM "transaction" t
                   JOIN merchants m ON t.merchant_id = m.merchant_id
                   WHERE t.fraud_classification = 'Fraud'
                   GROUP BY m.merchant_state
                   ORDER BY fraud_amount DESC
                   LIMIT 10"#
            }

            Report::FraudAmountByMerchant => {
                r#"SELECT m.merchant_id, SUM(t.amount) AS total
                   FROM merchants m
                   JOIN "transaction" t ON m.merchant_id = t.merchant_id
                   WHERE t.fraud_classification = 'Fraud'
                   GROUP BY m.merchant_id
                   ORDER BY total DESC
                   LIMIT 10"#
            }

            Report::FraudCasesByGender => {
                r#"SELECT u.gender, COUNT(t.id) AS fraud_cases
                   FROM "transaction" t
                   JOIN user u ON t.client_id = u.id
                   WHERE t.fraud_classification = 'Fraud'
                   GROUP BY u.gender"#
            }

            Report::MonthlyFraudTrend => {
                r#"SELECT strftime('%m', date) AS month, SUM(amount) AS fraud_amount
                   FROM "transaction"
                   WHERE fraud_classification = 'Fraud'
                     AND strftime('%m', date) IS NOT NULL
                   GROUP BY month
                   ORDER BY fraud_amount DESC"#
            }

            Report::FraudAmountByAgeGroup => {
                r#"SELECT u.AgeGroup, SUM(t.amount) AS fraud_amount
                   FROM "transaction" t
                   JOIN user u ON u.id = t.client_id
                   WHERE t.fraud_classification = 'Fraud'
                   GROUP BY u.AgeGroup
                   ORDER BY fraud_amount DESC"#
            }

            Report::TopClientsByFraudAmount => {
                r#"SELECT client_id, SUM(amount) AS total_fraud,
                          RANK() OVER (ORDER BY SUM(amount) DESC) AS ranking
                   FROM "transaction"
                   WHERE fraud_classification = 'Fraud'
                   GROUP BY client_id"#
            }

            Report::MovingAverageByClient => {
                r#"SELECT id, client_id, amount, fraud_classification,
                          AVG(amount) OVER (
                              PARTITION BY client_id ORDER BY date
                              ROWS BETWEEN 2 PRECEDING AND CURRENT ROW
                          ) AS moving_avg
                   FROM "transaction""#
            }

            Report::FraudByTransactionTime => {
                r#"SELECT id, client_id, amount,
                          strftime('%H:%M:%S', date) AS transaction_time,
                          CASE
                              WHEN CAST(strftime('%H', date) AS INTEGER) BETWEEN 0 AND 6
                                  THEN 'Late Night'
                              WHEN CAST(strftime('%H', date) AS INTEGER) BETWEEN 7 AND 12
                                  THEN 'Morning'
                              WHEN CAST(strftime('%H', date) AS INTEGER) BETWEEN 13 AND 18
                                  THEN 'Afternoon'
                              ELSE 'Evening'
                          END AS time_category
                   FROM "transaction""#
            }

            Report::TopFraudCardBrand => {
                r#"SELECT card_brand FROM cards
                   WHERE id = (
                       SELECT card_id FROM "transaction"
                       WHERE fraud_classification = 'Fraud'
                       GROUP BY card_id
                       ORDER BY COUNT(id) DESC
                       LIMIT 1
                   )"#
            }

            Report::TopUsersByErrors => {
                r#"SELECT u.id AS user_id, u.creditscorecategory,
                          COUNT(t.errors) AS total_errors
                   FROM "transaction" t
                   JOIN user u ON t.client_id = u.id
                   WHERE t.errors IS NOT NULL
                   GROUP BY u.id, u.creditscorecategory
                   ORDER BY total_errors DESC
                   LIMIT 10"#
            }
        }
    }
}
