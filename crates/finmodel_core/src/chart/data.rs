use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub y: f64,
    pub tooltip: String,
}

/// One series: a named item (or category) and its value per period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChartData {
    pub item: String,
    pub chart_data_points: Vec<ChartDataPoint>,
}

impl ItemChartData {
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.chart_data_points.iter().map(|p| p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub asset_data: Vec<ItemChartData>,
    pub debt_data: Vec<ItemChartData>,
    pub expenses_data: Vec<ItemChartData>,
    pub incomes_data: Vec<ItemChartData>,
    pub tax_data: Vec<ItemChartData>,
}

impl ChartData {
    /// Series named `item` across every chart
    pub fn series(&self, item: &str) -> Option<&ItemChartData> {
        [
            &self.asset_data,
            &self.debt_data,
            &self.expenses_data,
            &self.incomes_data,
            &self.tax_data,
        ]
        .into_iter()
        .flatten()
        .find(|s| s.item == item)
    }
}
