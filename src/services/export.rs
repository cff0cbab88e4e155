//! Column manifest of the booking report and CSV rendering over it.

use chrono::DateTime;

use crate::domain::booking::BookingRoute;
use crate::domain::report_row::ExpandedRow;
use crate::services::errors::{ServiceError, ServiceResult};

/// UTF-8 byte order mark prefixed to exports so spreadsheet tools pick the
/// right encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Addressable fields of an [`ExpandedRow`], named by their dotted path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportField {
    Id,
    CustomerName,
    CustomerId,
    Type,
    CampaignName,
    BookingCode,
    BookingDate,
    Locator,
    Status,
    PurchaseId,
    Description,
    Date,
    UserName,
    PassengerName,
    PassengerLastName,
    PassengerEmail,
    PassengerPhone,
    PassengerDocumentType,
    PassengerDocumentId,
    PassengerBirthdate,
    PassengerAddress,
    PointsTotalValue,
    CashTotalValue,
    CashPrice,
}

impl ReportField {
    /// Dotted path of the field in the booking document.
    pub const fn path(self) -> &'static str {
        match self {
            ReportField::Id => "id",
            ReportField::CustomerName => "customerName",
            ReportField::CustomerId => "customerId",
            ReportField::Type => "type",
            ReportField::CampaignName => "campaignName",
            ReportField::BookingCode => "bookingCode",
            ReportField::BookingDate => "bookingDate",
            ReportField::Locator => "locator",
            ReportField::Status => "status",
            ReportField::PurchaseId => "purchaseId",
            ReportField::Description => "description",
            ReportField::Date => "date",
            ReportField::UserName => "user.userName",
            ReportField::PassengerName => "passengerName",
            ReportField::PassengerLastName => "passengerLastName",
            ReportField::PassengerEmail => "passengerEmail",
            ReportField::PassengerPhone => "passengerPhone",
            ReportField::PassengerDocumentType => "passengerDocumentType",
            ReportField::PassengerDocumentId => "passengerDocumentId",
            ReportField::PassengerBirthdate => "passengerBirthdate",
            ReportField::PassengerAddress => "passengerAddress",
            ReportField::PointsTotalValue => "pointsTotalValue",
            ReportField::CashTotalValue => "cashTotalValue",
            ReportField::CashPrice => "cashPrice",
        }
    }

    /// Raw value of the field in `row`, `None` when absent.
    pub fn value(self, row: &ExpandedRow) -> Option<String> {
        let details = &row.details;
        let totals = row.totals.as_ref();
        match self {
            ReportField::Id => Some(details.id.to_string()),
            ReportField::CustomerName => details.customer_name.clone(),
            ReportField::CustomerId => Some(details.customer_id.to_string()),
            ReportField::Type => Some(details.booking_type.to_string()),
            ReportField::CampaignName => details.campaign_name.clone(),
            ReportField::BookingCode => Some(details.booking_code.clone()),
            ReportField::BookingDate => Some(details.booking_date.to_string()),
            ReportField::Locator => details.locator.clone(),
            ReportField::Status => Some(details.status.to_string()),
            ReportField::PurchaseId => details.purchase_id.clone(),
            ReportField::Description => details.description.clone(),
            ReportField::Date => details.date.map(|date| date.to_string()),
            ReportField::UserName => Some(details.user.user_name.clone()),
            ReportField::PassengerName => row.passenger_name.clone(),
            ReportField::PassengerLastName => row.passenger_last_name.clone(),
            ReportField::PassengerEmail => row.passenger_email.clone(),
            ReportField::PassengerPhone => row.passenger_phone.clone(),
            ReportField::PassengerDocumentType => row.passenger_document_type.clone(),
            ReportField::PassengerDocumentId => row.passenger_document_id.clone(),
            ReportField::PassengerBirthdate => row.passenger_birthdate.clone(),
            ReportField::PassengerAddress => row.passenger_address.clone(),
            ReportField::PointsTotalValue => totals
                .and_then(|t| t.points_total_value)
                .map(|v| v.to_string()),
            ReportField::CashTotalValue => totals
                .and_then(|t| t.cash_total_value)
                .map(|v| v.to_string()),
            ReportField::CashPrice => totals.and_then(|t| t.cash_price).map(|v| v.to_string()),
        }
    }
}

pub type CellRenderer = fn(&ExpandedRow) -> String;

/// One column of the report table.
#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub title: String,
    pub field: Option<ReportField>,
    pub hidden: bool,
    pub export: bool,
    pub render: Option<CellRenderer>,
}

impl ColumnDef {
    pub fn new(title: impl Into<String>, field: ReportField) -> Self {
        Self {
            title: title.into(),
            field: Some(field),
            hidden: false,
            export: true,
            render: None,
        }
    }

    /// Column kept out of the table and the export, titled by its field path.
    pub fn hidden_field(field: ReportField) -> Self {
        Self {
            hidden: true,
            ..Self::new(field.path(), field)
        }
    }

    pub fn rendered(mut self, render: CellRenderer) -> Self {
        self.render = Some(render);
        self
    }

    /// Displayed on screen but left out of exports.
    pub fn screen_only(mut self) -> Self {
        self.export = false;
        self
    }

    /// Text of this column's cell for `row`. A renderer wins over the raw
    /// field value.
    pub fn cell(&self, row: &ExpandedRow) -> String {
        if let Some(render) = self.render {
            return render(row);
        }
        self.field
            .and_then(|field| field.value(row))
            .unwrap_or_default()
    }

    fn is_visible(&self) -> bool {
        !self.hidden && self.field.is_some()
    }

    fn is_exportable(&self) -> bool {
        self.is_visible() && self.export
    }
}

/// Columns shown in the booking table.
pub fn visible_columns(columns: &[ColumnDef]) -> Vec<&ColumnDef> {
    columns.iter().filter(|c| c.is_visible()).collect()
}

/// Columns written to the CSV: not hidden, bound to a field, export enabled.
pub fn exportable_columns(columns: &[ColumnDef]) -> Vec<&ColumnDef> {
    columns.iter().filter(|c| c.is_exportable()).collect()
}

/// Writes a header of column titles followed by one record per row.
pub fn write_csv(rows: &[ExpandedRow], columns: &[ColumnDef]) -> ServiceResult<Vec<u8>> {
    let columns = exportable_columns(columns);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.title.as_str()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.cell(row)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ServiceError::Export(e.to_string()))
}

/// A finished export ready to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

impl CsvExport {
    pub fn new(route: BookingRoute, csv: Vec<u8>) -> Self {
        let mut content = Vec::with_capacity(UTF8_BOM.len() + csv.len());
        content.extend_from_slice(UTF8_BOM);
        content.extend_from_slice(&csv);
        Self {
            filename: format!("Relatório de Resgates - {}.csv", route.title()),
            content,
        }
    }
}

/// Formats epoch milliseconds as `dd/MM/yyyy` (UTC).
pub fn format_date(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format("%d/%m/%Y").to_string())
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let total_cents = (value.abs() * 100.0).round() as u64;
    let (units, cents) = (total_cents / 100, total_cents % 100);

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && total_cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents:02}")
}

fn render_type(row: &ExpandedRow) -> String {
    row.details.booking_type.translated().to_string()
}

fn render_booking_date(row: &ExpandedRow) -> String {
    format_date(row.details.booking_date).unwrap_or_else(|| "-".to_string())
}

fn render_date(row: &ExpandedRow) -> String {
    row.details
        .date
        .and_then(format_date)
        .unwrap_or_else(|| "-".to_string())
}

fn render_passenger(row: &ExpandedRow) -> String {
    let name = row.passenger_name.as_deref().unwrap_or_default();
    let last_name = row.passenger_last_name.as_deref().unwrap_or_default();
    format!("{name} {last_name}").trim().to_string()
}

fn render_document(row: &ExpandedRow) -> String {
    match (&row.passenger_document_type, &row.passenger_document_id) {
        (Some(kind), Some(id)) if !kind.is_empty() && !id.is_empty() => format!("{kind}: {id}"),
        _ => "-".to_string(),
    }
}

fn render_cash_total(row: &ExpandedRow) -> String {
    row.totals
        .as_ref()
        .and_then(|t| t.cash_total_value)
        .map(format_brl)
        .unwrap_or_default()
}

fn render_cash_price(row: &ExpandedRow) -> String {
    row.totals
        .as_ref()
        .and_then(|t| t.cash_price)
        .map(format_brl)
        .unwrap_or_default()
}

/// The booking report's columns in display order.
pub fn default_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("Empresa", ReportField::CustomerName),
        ColumnDef::new("Tipo", ReportField::Type).rendered(render_type),
        ColumnDef::new("Campanha", ReportField::CampaignName),
        ColumnDef::new("Código", ReportField::BookingCode),
        ColumnDef::new("Data reserva", ReportField::BookingDate).rendered(render_booking_date),
        ColumnDef::new("Localizador", ReportField::Locator),
        ColumnDef::new("Status", ReportField::Status),
        ColumnDef::new("Pedido", ReportField::PurchaseId),
        ColumnDef::new("Descrição", ReportField::Description),
        ColumnDef::new("Data", ReportField::Date).rendered(render_date),
        ColumnDef::new("Usuário", ReportField::UserName),
        ColumnDef::new("Passageiro", ReportField::PassengerName).rendered(render_passenger),
        ColumnDef::hidden_field(ReportField::PassengerLastName),
        ColumnDef::hidden_field(ReportField::PassengerDocumentType),
        ColumnDef::new("Documento", ReportField::PassengerDocumentId).rendered(render_document),
        ColumnDef::new("Data de nascimento", ReportField::PassengerBirthdate),
        ColumnDef::new("Endereço", ReportField::PassengerAddress),
        ColumnDef::new("E-mail", ReportField::PassengerEmail),
        ColumnDef::new("Telefone", ReportField::PassengerPhone),
        ColumnDef::new("Valor (pontos)", ReportField::PointsTotalValue),
        ColumnDef::new("Valor (R$)", ReportField::CashTotalValue).rendered(render_cash_total),
        ColumnDef::new("Preço total (R$)", ReportField::CashPrice).rendered(render_cash_price),
    ]
}
