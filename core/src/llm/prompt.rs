use crate::report::DebtReport;

/// Prompt asking the primary provider for a follow-up notice
pub fn build_notice_prompt(report: &DebtReport) -> String {
    format!(
        "Create a professional but firm follow-up message regarding delayed salary payment.

Employer: {employer}
Employee: {employee}
Employee wallet: {wallet}
Amount: {amount}
Due Date: {due}

The message should:
- Be professional but assertive
- Mention the proof has been recorded on the Solana blockchain
- Request immediate payment
- Mention potential legal consequences if not resolved
- Be concise (under 200 words)
- Include that this is an automated message from the PayGuard system",
        employer = report.employer_name,
        employee = report.employee_name,
        wallet = report.employee_wallet,
        amount = report.debt_amount,
        due = report.due_date_str(),
    )
}

/// Network-free notice used when the primary provider cannot deliver
pub fn fallback_notice(report: &DebtReport) -> String {
    format!(
        "Subject: Formal Notice Regarding Delayed Salary Payment - {employee}

Dear {employer},

I am writing to formally address the outstanding salary payment for {employee}.

The amount of {amount} was due on {due} and remains unpaid.

Please be advised that this debt obligation has been immutably recorded on the Solana blockchain as verifiable proof through our PayGuard system.

We require immediate payment to resolve this matter. Failure to remit payment may result in further action as permitted by law.

This is an automated message from the PayGuard debt verification system.

Sincerely,
PayGuard Automated System",
        employee = report.employee_name,
        employer = report.employer_name,
        amount = report.debt_amount,
        due = report.due_date_str(),
    )
}
