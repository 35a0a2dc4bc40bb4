mod portfolio;
mod reports;
