// In crates/core-types/src/lib.rs

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod pagination;
pub mod records;
pub mod stats;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use pagination::{ListFilterParams, PaginationMeta};
pub use records::{ExecutionLog, ForecastListItem, MarketSnapshot};
pub use stats::{
    CostPeriod, CostSummary, CurrentMarketData, DecisionStats, EquityPoint, ExecutionLogsStats,
    ForecastGrid, ForecastPoint, LlmCosts, MarketAsset, PerformanceData, PerformanceStats,
    TradingCosts,
};
pub use types::{
    AccountSummary, Bias, CircuitBreaker, CurrentMacroStrategy, CycleHealth, DashboardData,
    DecisionStatus, Direction, FeedHealth, HealthResponse, KeyLevels, MacdSignal, MacroStrategy,
    MarketMap, MarketOverview, OpenPositions, Operation, Position, PositionStatus, PositionsSummary,
    RsiSignal, StrategyHealth, SystemStatus, TradingDecision,
};
