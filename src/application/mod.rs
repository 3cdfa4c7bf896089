// Core forecasting algorithm
pub mod forecast_engine;

// Request orchestration around the engine
pub mod prediction_service;
